//! Experiment designs: combining scenarios and policies into an ordered,
//! uniquely identified sequence of experiments.

use serde::{Deserialize, Serialize};

use crate::error::DesignError;
use crate::model::{Experiment, ExperimentId, Policy, Scenario};

/// How scenarios and policies are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DesignKind {
    /// Cross every scenario with every policy.
    #[default]
    FullFactorial,
    /// Zip scenarios and policies index-for-index; counts must match.
    Paired,
}

/// Generate the ordered experiment sequence for a design.
///
/// Identities are assigned sequentially from 0 in output order by a counter
/// local to this call, so the output is a pure function of its inputs. Full
/// factorial iterates scenarios outer, policies inner, replications
/// innermost; paired designs replicate each zipped pair in place.
pub fn design_experiments(
    scenarios: &[Scenario],
    policies: &[Policy],
    replications: u32,
    kind: DesignKind,
) -> Result<Vec<Experiment>, DesignError> {
    if replications == 0 {
        return Err(DesignError::ZeroReplications);
    }

    let pairs: Vec<(&Scenario, &Policy)> = match kind {
        DesignKind::FullFactorial => scenarios
            .iter()
            .flat_map(|scenario| policies.iter().map(move |policy| (scenario, policy)))
            .collect(),
        DesignKind::Paired => {
            if scenarios.len() != policies.len() {
                return Err(DesignError::PairedLengthMismatch {
                    scenarios: scenarios.len(),
                    policies: policies.len(),
                });
            }
            scenarios.iter().zip(policies.iter()).collect()
        }
    };

    let mut experiments = Vec::with_capacity(pairs.len() * replications as usize);
    let mut next_id = 0u64;
    for (scenario, policy) in pairs {
        for replication in 0..replications {
            experiments.push(Experiment::new(
                ExperimentId(next_id),
                scenario.clone(),
                policy.clone(),
                replication,
            ));
            next_id += 1;
        }
    }
    Ok(experiments)
}
