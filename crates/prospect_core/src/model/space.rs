//! The parameter space: ordered uncertainties and levers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::SpaceError;
use crate::model::Parameter;

/// Typed description of a study's inputs: the uncertainties the analyst
/// cannot control and the levers they can. Validated at construction and
/// immutable afterwards; names are unique across the combined space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    uncertainties: Vec<Parameter>,
    levers: Vec<Parameter>,
}

impl ParameterSpace {
    pub fn new(
        uncertainties: Vec<Parameter>,
        levers: Vec<Parameter>,
    ) -> Result<Self, SpaceError> {
        let mut seen = HashSet::new();
        for parameter in uncertainties.iter().chain(levers.iter()) {
            parameter.validate()?;
            if !seen.insert(parameter.name.as_str()) {
                return Err(SpaceError::DuplicateName(parameter.name.clone()));
            }
        }
        Ok(Self {
            uncertainties,
            levers,
        })
    }

    #[must_use]
    pub fn uncertainties(&self) -> &[Parameter] {
        &self.uncertainties
    }

    #[must_use]
    pub fn levers(&self) -> &[Parameter] {
        &self.levers
    }

    #[must_use]
    pub fn uncertainty(&self, name: &str) -> Option<&Parameter> {
        self.uncertainties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn lever(&self, name: &str) -> Option<&Parameter> {
        self.levers.iter().find(|p| p.name == name)
    }
}
