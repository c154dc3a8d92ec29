//! Model outcomes.

use serde::{Deserialize, Serialize};

/// A single outcome variable's value: a scalar indicator or a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutcomeValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl OutcomeValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            OutcomeValue::Scalar(v) => Some(*v),
            OutcomeValue::Series(_) => None,
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            OutcomeValue::Scalar(_) => None,
            OutcomeValue::Series(v) => Some(v),
        }
    }
}

/// The successful result of one experiment: outcome-variable name to value,
/// in the order the model reported them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outcome {
    values: Vec<(String, OutcomeValue)>,
}

impl Outcome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.push((name.into(), OutcomeValue::Scalar(value)));
        self
    }

    #[must_use]
    pub fn with_series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.values.push((name.into(), OutcomeValue::Series(values)));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OutcomeValue> {
        self.values
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OutcomeValue::as_scalar)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutcomeValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
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
