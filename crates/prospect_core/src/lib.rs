//! Exploratory-modeling core library
//!
//! This crate provides the engine for decision-making-under-deep-uncertainty
//! studies: it generates reproducible experiment designs over mixed-type
//! uncertainty and lever spaces, fans them out across a pool of workers
//! against a caller-supplied model adapter with per-experiment fault
//! isolation, accumulates outcomes into columnar tables keyed by experiment
//! identity, and induces box-shaped rules over the inputs to explain where
//! outcomes turn interesting (scenario discovery).
//!
//! The simulation model itself stays opaque: anything implementing
//! [`runner::Model`], a single `run(scenario, policy)` operation, can be
//! driven. A study typically reads as:
//!
//! ```ignore
//! use std::sync::Arc;
//! use prospect_core::model::{Parameter, ParameterSpace, Policy};
//! use prospect_core::sampling::{SampleKind, sample_scenarios};
//! use prospect_core::design::{DesignKind, design_experiments};
//! use prospect_core::runner::{EnsembleProgress, RunnerConfig, run_ensemble};
//! use prospect_core::discovery::{PrimConfig, discover};
//!
//! let space = ParameterSpace::new(
//!     vec![Parameter::real("demand", 0.0, 10.0)],
//!     vec![Parameter::categorical("strategy", ["hedge", "expand"])],
//! )?;
//! let scenarios = sample_scenarios(&space, 500, 42, SampleKind::LatinHypercube)?;
//! let experiments = design_experiments(
//!     &scenarios, &[Policy::baseline(&space)], 1, DesignKind::FullFactorial)?;
//! let result = run_ensemble(
//!     Arc::new(my_model), experiments, &RunnerConfig::default(), &EnsembleProgress::new())?;
//! let boxes = discover(
//!     &result.store, |o| o.scalar("cost").is_some_and(|c| c > 1e6), &PrimConfig::default())?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod design;
pub mod discovery;
pub mod error;
pub mod runner;
pub mod sampling;
pub mod store;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use design::{DesignKind, design_experiments};
pub use discovery::{PrimBox, PrimConfig, discover};
pub use model::{Experiment, ExperimentId, Outcome, Parameter, ParameterSpace, Policy, Scenario};
pub use runner::{EnsembleProgress, Model, RunnerConfig, run_ensemble, run_ensemble_with};
pub use sampling::{SampleKind, sample_policies, sample_scenarios};
pub use store::ResultsStore;
