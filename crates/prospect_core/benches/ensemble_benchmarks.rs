//! Criterion benchmarks for prospect_core
//!
//! Run with: cargo bench -p prospect_core

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use prospect_core::design::{DesignKind, design_experiments};
use prospect_core::model::{Outcome, Parameter, ParameterSpace, Policy, Scenario};
use prospect_core::runner::{EnsembleProgress, RunnerConfig, run_ensemble};
use prospect_core::sampling::{SampleKind, sample_scenarios};

fn study_space() -> ParameterSpace {
    ParameterSpace::new(
        vec![
            Parameter::real("demand", 0.0, 100.0),
            Parameter::real("price", 1.0, 4.0),
            Parameter::integer("capacity", 10, 500),
            Parameter::categorical("regime", ["stable", "volatile", "collapse"]),
        ],
        vec![Parameter::real("subsidy", 0.0, 1.0)],
    )
    .unwrap()
}

fn bench_sampling(c: &mut Criterion) {
    let space = study_space();
    c.bench_function("latin_hypercube_1000x4", |b| {
        b.iter(|| {
            sample_scenarios(&space, black_box(1000), 42, SampleKind::LatinHypercube).unwrap()
        })
    });
    c.bench_function("uniform_1000x4", |b| {
        b.iter(|| sample_scenarios(&space, black_box(1000), 42, SampleKind::Uniform).unwrap())
    });
}

fn bench_ensemble_execution(c: &mut Criterion) {
    let space = study_space();
    let scenarios = sample_scenarios(&space, 1000, 7, SampleKind::LatinHypercube).unwrap();
    let experiments = design_experiments(
        &scenarios,
        &[Policy::baseline(&space)],
        1,
        DesignKind::FullFactorial,
    )
    .unwrap();

    let model = Arc::new(|scenario: &Scenario, _policy: &Policy| {
        let demand = scenario.real("demand").unwrap_or(0.0);
        let price = scenario.real("price").unwrap_or(1.0);
        Ok(Outcome::new().with_scalar("revenue", demand * price))
    });

    let config = RunnerConfig {
        workers: 4,
        ..RunnerConfig::default()
    };
    c.bench_function("ensemble_1000_experiments_4_workers", |b| {
        b.iter(|| {
            run_ensemble(
                Arc::clone(&model),
                black_box(experiments.clone()),
                &config,
                &EnsembleProgress::new(),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_sampling, bench_ensemble_execution);
criterion_main!(benches);
