//! Integration tests for the exploratory-modeling engine
//!
//! Tests are organized by topic:
//! - `sampling` - Determinism, domain membership, and stratification
//! - `design` - Factorial and paired designs, identity assignment
//! - `store` - Columnar results tables and the identity invariant
//! - `runner` - Worker pool, fault isolation, thresholds, cancellation
//! - `discovery` - Box peeling/pasting on synthetic data
//! - `end_to_end` - A full study from space to discovered boxes

mod end_to_end;
mod sampling;
mod store;

use crate::model::{
    Experiment, ExperimentId, Parameter, ParameterSpace, ParameterValue, Policy, Scenario,
};

/// A space with one real uncertainty `u` in `[0, 10]` and no levers.
pub(crate) fn single_uncertainty_space() -> ParameterSpace {
    ParameterSpace::new(vec![Parameter::real("u", 0.0, 10.0)], vec![]).unwrap()
}

/// Build an experiment with the given id over a one-value scenario.
pub(crate) fn experiment_with_u(id: u64, u: f64) -> Experiment {
    let scenario = Scenario::from_values(vec![("u".to_string(), ParameterValue::Real(u))]);
    Experiment::new(ExperimentId(id), scenario, Policy::new("none", vec![]), 0)
}
