//! Extraction of the analysis matrix from the results store.
//!
//! Scenario discovery works on the successful experiments only: every input
//! column becomes either a numeric column (reals, integers) or a coded
//! categorical column (categories, booleans), and the caller's classifier
//! labels each row interesting or not.

use rustc_hash::FxHashMap;

use crate::error::DiscoveryError;
use crate::model::ParameterValue;
use crate::store::{OutcomeRowView, ResultsStore};

/// One input dimension, coded for box operations.
#[derive(Debug, Clone)]
pub(crate) enum ColumnData {
    Numeric(Vec<f64>),
    Categorical { levels: Vec<String>, codes: Vec<usize> },
}

/// The matrix scenario discovery peels over: one row per successful
/// experiment, in outcome-table order.
#[derive(Debug, Clone)]
pub(crate) struct DiscoveryData {
    pub columns: Vec<(String, ColumnData)>,
    pub labels: Vec<bool>,
}

impl DiscoveryData {
    pub(crate) fn from_store<'s, F>(
        store: &'s ResultsStore,
        mut classifier: F,
        min_cases: usize,
    ) -> Result<Self, DiscoveryError>
    where
        F: FnMut(OutcomeRowView<'s>) -> bool,
    {
        let rows: Vec<_> = store.completed().collect();
        if rows.len() < min_cases {
            return Err(DiscoveryError::TooFewCases {
                have: rows.len(),
                need: min_cases,
            });
        }

        let labels: Vec<bool> = rows.iter().map(|row| classifier(row.outcome())).collect();
        if !labels.iter().any(|interesting| *interesting) {
            return Err(DiscoveryError::NoInterestingCases);
        }

        let names: Vec<String> = store
            .experiments()
            .column_names()
            .map(str::to_string)
            .collect();
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let values: Vec<ParameterValue> = store
                .experiments()
                .column(&name)
                .map(|column| {
                    rows.iter()
                        .map(|row| column[row.experiment_row()].clone())
                        .collect()
                })
                .unwrap_or_default();
            columns.push((name, encode(values)));
        }

        Ok(Self { columns, labels })
    }

    /// Number of analysis rows (successful experiments).
    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Numeric columns stay numeric; everything else is coded against its
/// observed levels, in order of first appearance (deterministic given
/// deterministic row order).
fn encode(values: Vec<ParameterValue>) -> ColumnData {
    if values
        .iter()
        .all(|value| value.as_numeric().is_some())
    {
        ColumnData::Numeric(
            values
                .iter()
                .map(|value| value.as_numeric().unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        let mut levels: Vec<String> = Vec::new();
        let mut by_label: FxHashMap<String, usize> = FxHashMap::default();
        let codes = values
            .iter()
            .map(|value| {
                let label = value.label();
                match by_label.get(&label) {
                    Some(&code) => code,
                    None => {
                        let code = levels.len();
                        by_label.insert(label.clone(), code);
                        levels.push(label);
                        code
                    }
                }
            })
            .collect();
        ColumnData::Categorical { levels, codes }
    }
}
