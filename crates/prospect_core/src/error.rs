use thiserror::Error;

use crate::model::ExperimentId;

/// Errors raised while constructing a parameter space.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("parameter `{name}` has an empty domain")]
    EmptyDomain { name: String },

    #[error("parameter `{name}` has its lower bound above its upper bound")]
    InvertedRange { name: String },

    #[error("parameter `{name}` has invalid category weights: {reason}")]
    InvalidWeights { name: String, reason: &'static str },

    #[error("parameter name `{0}` appears more than once in the space")]
    DuplicateName(String),

    #[error("default value for parameter `{name}` lies outside its domain")]
    DefaultOutsideDomain { name: String },
}

/// Errors raised by the samplers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("sample size must be at least 1")]
    EmptySample,

    #[error("category weights for parameter `{name}` cannot be sampled")]
    InvalidWeights { name: String },
}

/// Errors raised at design-generation time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesignError {
    #[error("paired design requires equal counts, got {scenarios} scenarios and {policies} policies")]
    PairedLengthMismatch { scenarios: usize, policies: usize },

    #[error("replication count must be at least 1")]
    ZeroReplications,
}

/// Errors raised by the results store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("a result for experiment {0} is already recorded")]
    DuplicateResult(ExperimentId),

    #[error("experiment {id} does not match the table columns at `{column}`")]
    ColumnMismatch { id: ExperimentId, column: String },
}

/// Synchronous configuration errors from the ensemble runner. Failures of
/// individual experiments are data (`ModelFailure`), not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnsembleError {
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
}

/// Errors raised by scenario discovery before any box is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscoveryError {
    #[error("the classifier marked no successful outcome as interesting")]
    NoInterestingCases,

    #[error("scenario discovery needs at least {need} successful outcomes, got {have}")]
    TooFewCases { have: usize, need: usize },
}

/// The failure a model adapter reports for a single experiment. Recorded in
/// the results store against the experiment identity; never aborts siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ModelFailure(pub String);

impl ModelFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.0
    }
}
