//! Tests for sampler determinism, domain membership, and stratification.

use crate::error::{SamplingError, SpaceError};
use crate::model::{Parameter, ParameterSpace, ParameterValue};
use crate::sampling::{SampleKind, sample_policies, sample_scenarios};

fn mixed_space() -> ParameterSpace {
    ParameterSpace::new(
        vec![
            Parameter::real("price", 1.0, 4.0),
            Parameter::integer("fleet", 2, 9),
            Parameter::categorical("regime", ["stable", "volatile", "collapse"]),
            Parameter::boolean("shock"),
            Parameter::constant("base_year", ParameterValue::Integer(2030)),
        ],
        vec![Parameter::real("subsidy", 0.0, 1.0)],
    )
    .unwrap()
}

#[test]
fn test_sample_is_deterministic() {
    let space = mixed_space();
    for kind in [SampleKind::LatinHypercube, SampleKind::Uniform] {
        let first = sample_scenarios(&space, 50, 99, kind).unwrap();
        let second = sample_scenarios(&space, 50, 99, kind).unwrap();
        assert_eq!(first, second, "identical (space, n, seed) must reproduce");
    }
}

#[test]
fn test_different_seeds_differ() {
    let space = mixed_space();
    let first = sample_scenarios(&space, 50, 1, SampleKind::LatinHypercube).unwrap();
    let second = sample_scenarios(&space, 50, 2, SampleKind::LatinHypercube).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_values_stay_in_domain() {
    let space = mixed_space();
    for kind in [SampleKind::LatinHypercube, SampleKind::Uniform] {
        let scenarios = sample_scenarios(&space, 200, 7, kind).unwrap();
        assert_eq!(scenarios.len(), 200);
        for scenario in &scenarios {
            let price = scenario.real("price").unwrap();
            assert!((1.0..=4.0).contains(&price), "price {price} out of range");
            let fleet = scenario.integer("fleet").unwrap();
            assert!((2..=9).contains(&fleet), "fleet {fleet} out of range");
            let regime = scenario.category("regime").unwrap();
            assert!(["stable", "volatile", "collapse"].contains(&regime));
            assert!(scenario.get("shock").unwrap().as_bool().is_some());
            assert_eq!(scenario.integer("base_year"), Some(2030));
        }
    }
}

#[test]
fn test_latin_hypercube_hits_every_stratum_once() {
    let space = mixed_space();
    let n = 40;
    let scenarios = sample_scenarios(&space, n, 13, SampleKind::LatinHypercube).unwrap();

    let mut counts = vec![0usize; n];
    for scenario in &scenarios {
        let price = scenario.real("price").unwrap();
        let stratum = (((price - 1.0) / 3.0) * n as f64).floor() as usize;
        counts[stratum.min(n - 1)] += 1;
    }
    assert!(
        counts.iter().all(|&c| c == 1),
        "every stratum must be hit exactly once, got {counts:?}"
    );
}

#[test]
fn test_latin_hypercube_integer_covers_range_evenly() {
    // Six strata over six integers: each value appears exactly once.
    let space = ParameterSpace::new(vec![Parameter::integer("die", 1, 6)], vec![]).unwrap();
    let scenarios = sample_scenarios(&space, 6, 11, SampleKind::LatinHypercube).unwrap();
    let mut seen: Vec<i64> = scenarios
        .iter()
        .map(|s| s.integer("die").unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_weighted_category_with_zero_weight_never_drawn() {
    let space = ParameterSpace::new(
        vec![Parameter::weighted_categorical(
            "mode",
            ["car", "rail"],
            vec![1.0, 0.0],
        )],
        vec![],
    )
    .unwrap();
    let scenarios = sample_scenarios(&space, 100, 3, SampleKind::Uniform).unwrap();
    assert!(
        scenarios.iter().all(|s| s.category("mode") == Some("car")),
        "zero-weight category must never be drawn"
    );
}

#[test]
fn test_sampled_policies_are_named_by_index() {
    let space = mixed_space();
    let policies = sample_policies(&space, 3, 21, SampleKind::LatinHypercube).unwrap();
    let names: Vec<&str> = policies.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["policy_0", "policy_1", "policy_2"]);
    for policy in &policies {
        let subsidy = policy.real("subsidy").unwrap();
        assert!((0.0..=1.0).contains(&subsidy));
    }
}

#[test]
fn test_empty_sample_is_rejected() {
    let space = mixed_space();
    let result = sample_scenarios(&space, 0, 1, SampleKind::Uniform);
    assert_eq!(result.unwrap_err(), SamplingError::EmptySample);
}

#[test]
fn test_inverted_range_is_rejected() {
    let result = ParameterSpace::new(vec![Parameter::real("u", 5.0, 1.0)], vec![]);
    assert_eq!(
        result.unwrap_err(),
        SpaceError::InvertedRange {
            name: "u".to_string()
        }
    );
}

#[test]
fn test_empty_categories_are_rejected() {
    let categories: Vec<String> = vec![];
    let result = ParameterSpace::new(vec![Parameter::categorical("c", categories)], vec![]);
    assert_eq!(
        result.unwrap_err(),
        SpaceError::EmptyDomain {
            name: "c".to_string()
        }
    );
}

#[test]
fn test_duplicate_names_across_sets_are_rejected() {
    let result = ParameterSpace::new(
        vec![Parameter::real("x", 0.0, 1.0)],
        vec![Parameter::boolean("x")],
    );
    assert_eq!(result.unwrap_err(), SpaceError::DuplicateName("x".to_string()));
}

#[test]
fn test_mismatched_weights_are_rejected() {
    let result = ParameterSpace::new(
        vec![Parameter::weighted_categorical(
            "mode",
            ["car", "rail"],
            vec![1.0],
        )],
        vec![],
    );
    assert!(matches!(
        result.unwrap_err(),
        SpaceError::InvalidWeights { .. }
    ));
}

#[test]
fn test_default_outside_domain_is_rejected() {
    let parameter = Parameter::real("u", 0.0, 1.0).with_default(ParameterValue::Real(2.0));
    let result = ParameterSpace::new(vec![parameter], vec![]);
    assert_eq!(
        result.unwrap_err(),
        SpaceError::DefaultOutsideDomain {
            name: "u".to_string()
        }
    );
}
