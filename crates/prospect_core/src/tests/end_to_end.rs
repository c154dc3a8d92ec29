//! A complete study: sample, design, execute, and discover.

use std::sync::Arc;

use crate::design::{DesignKind, design_experiments};
use crate::discovery::{BoxLimit, PrimConfig, discover};
use crate::model::{Outcome, Parameter, ParameterSpace, ParameterValue, Policy, Scenario};
use crate::runner::{EnsembleProgress, RunnerConfig, run_ensemble};
use crate::sampling::{SampleKind, sample_scenarios};

/// The reference study: one real uncertainty `u` in `[0, 10]`, one
/// categorical lever `l` in `{a, b}`. The model doubles `u` under lever
/// `b`, so outcomes above 15 happen exactly when `u > 7.5` and `l = b`.
#[test]
fn test_full_study_discovers_lever_conditioned_threshold() {
    let space = ParameterSpace::new(
        vec![Parameter::real("u", 0.0, 10.0)],
        vec![Parameter::categorical("l", ["a", "b"])],
    )
    .unwrap();

    let scenarios = sample_scenarios(&space, 100, 2024, SampleKind::LatinHypercube).unwrap();
    let policies = vec![
        Policy::new("a", vec![("l".to_string(), ParameterValue::Category("a".to_string()))]),
        Policy::new("b", vec![("l".to_string(), ParameterValue::Category("b".to_string()))]),
    ];
    let experiments =
        design_experiments(&scenarios, &policies, 1, DesignKind::FullFactorial).unwrap();
    assert_eq!(experiments.len(), 200);

    let model = Arc::new(|scenario: &Scenario, policy: &Policy| {
        let u = scenario.real("u").unwrap_or(0.0);
        let value = if policy.category("l") == Some("a") {
            u
        } else {
            u * 2.0
        };
        Ok(Outcome::new().with_scalar("value", value))
    });

    let config = RunnerConfig {
        workers: 4,
        ..RunnerConfig::default()
    };
    let result = run_ensemble(model, experiments, &config, &EnsembleProgress::new()).unwrap();
    assert_eq!(result.completed, 200);
    assert_eq!(result.failed, 0);
    assert_eq!(result.store.len(), 200);

    let boxes = discover(
        &result.store,
        |outcome| outcome.scalar("value").is_some_and(|v| v > 15.0),
        &PrimConfig::default(),
    )
    .unwrap();

    assert!(!boxes.is_empty(), "the study must yield at least one box");
    let top = &boxes[0];
    assert!(top.density >= 0.95, "density {} too low", top.density);

    let u_limit = top
        .limits
        .iter()
        .find_map(|(name, limit)| (name == "u").then_some(limit))
        .expect("box must restrict u");
    let BoxLimit::Range { lower, .. } = u_limit else {
        panic!("u is numeric, got {u_limit:?}");
    };
    assert!(
        (lower - 7.5).abs() < 0.5,
        "lower bound on u is {lower}, expected near 7.5"
    );

    let l_limit = top
        .limits
        .iter()
        .find_map(|(name, limit)| (name == "l").then_some(limit))
        .expect("box must restrict l");
    let BoxLimit::Categories { allowed } = l_limit else {
        panic!("l is categorical, got {l_limit:?}");
    };
    assert_eq!(allowed, &vec!["b".to_string()], "box must be restricted to lever b");
}
