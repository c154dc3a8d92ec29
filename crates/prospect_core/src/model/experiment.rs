//! Scenarios, policies, and experiments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ParameterSpace, ParameterValue};

/// Globally unique, sequential experiment identity. Assigned at design
/// generation time, never reused; the join key between inputs and outcomes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ExperimentId(pub u64);

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One concrete assignment of values to all uncertainties, in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    values: Vec<(String, ParameterValue)>,
}

impl Scenario {
    #[must_use]
    pub fn from_values(values: Vec<(String, ParameterValue)>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    #[must_use]
    pub fn real(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParameterValue::as_real)
    }

    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParameterValue::as_integer)
    }

    #[must_use]
    pub fn category(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParameterValue::as_category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One concrete assignment of values to levers, with a display name so
/// analysts can tell candidate policies apart in results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    name: String,
    values: Vec<(String, ParameterValue)>,
}

impl Policy {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<(String, ParameterValue)>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// The canonical "no policy" baseline: every lever at its declared
    /// default, falling back to the least element of its domain.
    #[must_use]
    pub fn baseline(space: &ParameterSpace) -> Self {
        let values = space
            .levers()
            .iter()
            .map(|lever| {
                let value = lever
                    .default
                    .clone()
                    .unwrap_or_else(|| lever.least_value());
                (lever.name.clone(), value)
            })
            .collect();
        Self {
            name: "none".to_string(),
            values,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    #[must_use]
    pub fn real(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParameterValue::as_real)
    }

    #[must_use]
    pub fn category(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParameterValue::as_category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One unit of work: a scenario paired with a policy, replicated so
/// stochastic models can be sampled repeatedly under identical inputs.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    id: ExperimentId,
    scenario: Scenario,
    policy: Policy,
    replication: u32,
}

impl Experiment {
    #[must_use]
    pub fn new(id: ExperimentId, scenario: Scenario, policy: Policy, replication: u32) -> Self {
        Self {
            id,
            scenario,
            policy,
            replication,
        }
    }

    #[must_use]
    pub fn id(&self) -> ExperimentId {
        self.id
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn replication(&self) -> u32 {
        self.replication
    }
}
