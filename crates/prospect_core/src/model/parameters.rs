//! Parameter definitions for uncertainty and lever spaces.
//!
//! A parameter couples a name with a typed domain. Domains cover the input
//! kinds an exploratory study needs: continuous and integer ranges,
//! categorical sets (optionally weighted), booleans, and fixed constants.

use serde::{Deserialize, Serialize};

use crate::error::SpaceError;

/// A concrete value drawn from a parameter domain. Untagged variant order
/// matters: integers must be tried before reals so integral values
/// round-trip as integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Real(f64),
    Bool(bool),
    Category(String),
}

impl ParameterValue {
    /// Numeric view of the value: reals as-is, integers widened to f64.
    #[must_use]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ParameterValue::Real(v) => Some(*v),
            ParameterValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ParameterValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            ParameterValue::Category(v) => Some(v),
            _ => None,
        }
    }

    /// Display label for the value, used when grouping mixed columns.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ParameterValue::Real(v) => format!("{v}"),
            ParameterValue::Integer(v) => format!("{v}"),
            ParameterValue::Bool(v) => format!("{v}"),
            ParameterValue::Category(v) => v.clone(),
        }
    }
}

/// Domain of a single input parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Domain {
    /// Continuous range, sampled uniformly over `[lower, upper]`.
    Real { lower: f64, upper: f64 },
    /// Integer range, sampled uniformly over `[lower, upper]` inclusive.
    Integer { lower: i64, upper: i64 },
    /// Finite set of named categories, optionally weighted.
    Categorical {
        categories: Vec<String>,
        #[serde(default)]
        weights: Option<Vec<f64>>,
    },
    /// Two-category convenience domain over `{false, true}`.
    Boolean,
    /// Fixed value, returned unchanged by every sampler.
    Constant { value: ParameterValue },
}

/// A named model input: an uncertainty when exogenous, a lever when it
/// represents a decision. The distinction is carried by the parameter
/// space, not the parameter itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub domain: Domain,
    /// Declared default, used when building the baseline policy.
    #[serde(default)]
    pub default: Option<ParameterValue>,
}

impl Parameter {
    #[must_use]
    pub fn real(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            domain: Domain::Real { lower, upper },
            default: None,
        }
    }

    #[must_use]
    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            domain: Domain::Integer { lower, upper },
            default: None,
        }
    }

    #[must_use]
    pub fn categorical<I, S>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            domain: Domain::Categorical {
                categories: categories.into_iter().map(Into::into).collect(),
                weights: None,
            },
            default: None,
        }
    }

    /// Categorical parameter with explicit draw weights, one per category.
    #[must_use]
    pub fn weighted_categorical<I, S>(name: impl Into<String>, categories: I, weights: Vec<f64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            domain: Domain::Categorical {
                categories: categories.into_iter().map(Into::into).collect(),
                weights: Some(weights),
            },
            default: None,
        }
    }

    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: Domain::Boolean,
            default: None,
        }
    }

    #[must_use]
    pub fn constant(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            domain: Domain::Constant { value },
            default: None,
        }
    }

    /// Attach a default value, consumed by `Policy::baseline`.
    #[must_use]
    pub fn with_default(mut self, value: ParameterValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Check a concrete value for membership in this parameter's domain.
    #[must_use]
    pub fn contains(&self, value: &ParameterValue) -> bool {
        match (&self.domain, value) {
            (Domain::Real { lower, upper }, ParameterValue::Real(v)) => {
                *v >= *lower && *v <= *upper
            }
            (Domain::Integer { lower, upper }, ParameterValue::Integer(v)) => {
                *v >= *lower && *v <= *upper
            }
            (Domain::Categorical { categories, .. }, ParameterValue::Category(v)) => {
                categories.iter().any(|c| c == v)
            }
            (Domain::Boolean, ParameterValue::Bool(_)) => true,
            (Domain::Constant { value: fixed }, v) => fixed == v,
            _ => false,
        }
    }

    /// The least element of the domain: range lower bounds, the first
    /// category, `false`, or the constant itself. Used as the baseline
    /// value for levers without a declared default.
    #[must_use]
    pub fn least_value(&self) -> ParameterValue {
        match &self.domain {
            Domain::Real { lower, .. } => ParameterValue::Real(*lower),
            Domain::Integer { lower, .. } => ParameterValue::Integer(*lower),
            Domain::Categorical { categories, .. } => {
                ParameterValue::Category(categories.first().cloned().unwrap_or_default())
            }
            Domain::Boolean => ParameterValue::Bool(false),
            Domain::Constant { value } => value.clone(),
        }
    }

    /// Validate the domain and the default, if any. Called once when the
    /// parameter enters a space.
    pub(crate) fn validate(&self) -> Result<(), SpaceError> {
        match &self.domain {
            Domain::Real { lower, upper } => {
                if lower > upper {
                    return Err(SpaceError::InvertedRange {
                        name: self.name.clone(),
                    });
                }
            }
            Domain::Integer { lower, upper } => {
                if lower > upper {
                    return Err(SpaceError::InvertedRange {
                        name: self.name.clone(),
                    });
                }
            }
            Domain::Categorical {
                categories,
                weights,
            } => {
                if categories.is_empty() {
                    return Err(SpaceError::EmptyDomain {
                        name: self.name.clone(),
                    });
                }
                if let Some(weights) = weights {
                    if weights.len() != categories.len() {
                        return Err(SpaceError::InvalidWeights {
                            name: self.name.clone(),
                            reason: "one weight per category required",
                        });
                    }
                    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(SpaceError::InvalidWeights {
                            name: self.name.clone(),
                            reason: "weights must be finite and non-negative",
                        });
                    }
                    if weights.iter().sum::<f64>() <= 0.0 {
                        return Err(SpaceError::InvalidWeights {
                            name: self.name.clone(),
                            reason: "weights must sum to a positive value",
                        });
                    }
                }
            }
            Domain::Boolean | Domain::Constant { .. } => {}
        }

        if let Some(default) = &self.default
            && !self.contains(default)
        {
            return Err(SpaceError::DefaultOutsideDomain {
                name: self.name.clone(),
            });
        }

        Ok(())
    }
}
