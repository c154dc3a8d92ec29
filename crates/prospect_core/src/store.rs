//! Columnar, append-only storage for ensemble results.
//!
//! Two aligned tables keyed by experiment identity: the experiment table
//! (one row per submitted experiment, one column per input parameter, with
//! a failed flag) and the outcome table (one row per *successful*
//! experiment, one column per outcome variable). Rows are kept in identity
//! order whatever order results arrive in, so downstream analysis sees a
//! stable table regardless of worker scheduling. Append is the only
//! mutation; a row, once written for an identity, is never rewritten.

use crate::error::{ModelFailure, StoreError};
use crate::model::{Experiment, ExperimentId, Outcome, OutcomeValue, ParameterValue};

/// Input side of the store: scenario and policy values plus bookkeeping,
/// one row per experiment, in identity order.
#[derive(Debug, Clone, Default)]
pub struct ExperimentTable {
    ids: Vec<ExperimentId>,
    replications: Vec<u32>,
    policy_names: Vec<String>,
    failed: Vec<bool>,
    failures: Vec<Option<String>>,
    columns: Vec<(String, Vec<ParameterValue>)>,
}

impl ExperimentTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> &[ExperimentId] {
        &self.ids
    }

    #[must_use]
    pub fn row_of(&self, id: ExperimentId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    #[must_use]
    pub fn replication(&self, row: usize) -> Option<u32> {
        self.replications.get(row).copied()
    }

    #[must_use]
    pub fn policy_name(&self, row: usize) -> Option<&str> {
        self.policy_names.get(row).map(String::as_str)
    }

    #[must_use]
    pub fn failed(&self, row: usize) -> Option<bool> {
        self.failed.get(row).copied()
    }

    #[must_use]
    pub fn failure_message(&self, row: usize) -> Option<&str> {
        self.failures.get(row).and_then(|m| m.as_deref())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Full column of input values, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[ParameterValue]> {
        self.columns
            .iter()
            .find_map(|(n, values)| (n == name).then_some(values.as_slice()))
    }

    /// Single input value by row and column name.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&ParameterValue> {
        self.column(name).and_then(|values| values.get(row))
    }

    fn insert(
        &mut self,
        row: usize,
        experiment: &Experiment,
        failure: Option<&ModelFailure>,
    ) -> Result<(), StoreError> {
        let inputs: Vec<(&str, &ParameterValue)> = experiment
            .scenario()
            .iter()
            .chain(experiment.policy().iter())
            .collect();

        if self.ids.is_empty() {
            self.columns = inputs
                .iter()
                .map(|(name, _)| ((*name).to_string(), Vec::new()))
                .collect();
        } else if inputs.len() != self.columns.len() {
            return Err(StoreError::ColumnMismatch {
                id: experiment.id(),
                column: inputs
                    .get(self.columns.len())
                    .map_or_else(String::new, |(name, _)| (*name).to_string()),
            });
        }
        for ((name, _), (column_name, _)) in inputs.iter().zip(&self.columns) {
            if name != column_name {
                return Err(StoreError::ColumnMismatch {
                    id: experiment.id(),
                    column: (*name).to_string(),
                });
            }
        }

        self.ids.insert(row, experiment.id());
        self.replications.insert(row, experiment.replication());
        self.policy_names
            .insert(row, experiment.policy().name().to_string());
        self.failed.insert(row, failure.is_some());
        self.failures
            .insert(row, failure.map(|f| f.reason().to_string()));
        for ((_, value), (_, column)) in inputs.iter().zip(self.columns.iter_mut()) {
            column.insert(row, (*value).clone());
        }
        Ok(())
    }
}

/// Outcome side of the store: one row per successful experiment, in
/// identity order. Cells are optional so models that report different
/// outcome sets can coexist.
#[derive(Debug, Clone, Default)]
pub struct OutcomeTable {
    ids: Vec<ExperimentId>,
    columns: Vec<(String, Vec<Option<OutcomeValue>>)>,
}

impl OutcomeTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> &[ExperimentId] {
        &self.ids
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<OutcomeValue>]> {
        self.columns
            .iter()
            .find_map(|(n, values)| (n == name).then_some(values.as_slice()))
    }

    /// Scalar projection of an outcome column, `None` where the cell is
    /// missing or holds a series.
    #[must_use]
    pub fn scalar_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name).map(|values| {
            values
                .iter()
                .map(|cell| cell.as_ref().and_then(OutcomeValue::as_scalar))
                .collect()
        })
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<OutcomeRowView<'_>> {
        (row < self.ids.len()).then_some(OutcomeRowView { table: self, row })
    }

    fn insert(&mut self, row: usize, id: ExperimentId, outcome: &Outcome) {
        self.ids.insert(row, id);
        for (_, column) in &mut self.columns {
            column.insert(row, None);
        }
        for (name, value) in outcome.iter() {
            match self.columns.iter_mut().find(|(n, _)| n == name) {
                Some((_, column)) => column[row] = Some(value.clone()),
                None => {
                    let mut column = vec![None; self.ids.len()];
                    column[row] = Some(value.clone());
                    self.columns.push((name.to_string(), column));
                }
            }
        }
    }
}

/// Zero-copy view of one outcome row, handed to classifiers and analysis.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeRowView<'a> {
    table: &'a OutcomeTable,
    row: usize,
}

impl<'a> OutcomeRowView<'a> {
    #[must_use]
    pub fn id(&self) -> ExperimentId {
        self.table.ids[self.row]
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a OutcomeValue> {
        self.table
            .column(name)
            .and_then(|values| values[self.row].as_ref())
    }

    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OutcomeValue::as_scalar)
    }
}

/// A successful experiment joined across both tables: inputs plus outcome.
#[derive(Debug, Clone, Copy)]
pub struct CompletedRow<'a> {
    store: &'a ResultsStore,
    experiment_row: usize,
    outcome_row: usize,
}

impl<'a> CompletedRow<'a> {
    #[must_use]
    pub fn id(&self) -> ExperimentId {
        self.store.experiments.ids[self.experiment_row]
    }

    #[must_use]
    pub fn input(&self, name: &str) -> Option<&'a ParameterValue> {
        self.store.experiments.value(self.experiment_row, name)
    }

    #[must_use]
    pub fn outcome(&self) -> OutcomeRowView<'a> {
        OutcomeRowView {
            table: &self.store.outcomes,
            row: self.outcome_row,
        }
    }

    /// Row index into the experiment table, for columnar extraction.
    pub(crate) fn experiment_row(&self) -> usize {
        self.experiment_row
    }
}

/// The accumulated results of an ensemble run.
#[derive(Debug, Clone, Default)]
pub struct ResultsStore {
    experiments: ExperimentTable,
    outcomes: OutcomeTable,
}

impl ResultsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit one experiment's result. Rejects an identity that already has
    /// a row, leaving the existing row unchanged; this guards against
    /// double-counting on worker retries.
    pub fn append(
        &mut self,
        experiment: &Experiment,
        result: Result<&Outcome, &ModelFailure>,
    ) -> Result<(), StoreError> {
        let id = experiment.id();
        let row = match self.experiments.ids.binary_search(&id) {
            Ok(_) => return Err(StoreError::DuplicateResult(id)),
            Err(row) => row,
        };

        self.experiments.insert(row, experiment, result.err())?;
        if let Ok(outcome) = result {
            let outcome_row = match self.outcomes.ids.binary_search(&id) {
                // The experiment table had no row for this id, so the
                // outcome table cannot have one either.
                Ok(row) | Err(row) => row,
            };
            self.outcomes.insert(outcome_row, id, outcome);
        }
        Ok(())
    }

    /// Number of experiments recorded (success and failure alike).
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ExperimentId) -> bool {
        self.experiments.row_of(id).is_some()
    }

    /// Whether the given experiment failed; `None` if it was never recorded.
    #[must_use]
    pub fn is_failed(&self, id: ExperimentId) -> Option<bool> {
        self.experiments
            .row_of(id)
            .and_then(|row| self.experiments.failed(row))
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.experiments.failed.iter().filter(|f| **f).count()
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = ExperimentId> + '_ {
        self.experiments
            .ids
            .iter()
            .zip(&self.experiments.failed)
            .filter_map(|(id, failed)| failed.then_some(*id))
    }

    /// Full experiment table, failed rows included.
    #[must_use]
    pub fn experiments(&self) -> &ExperimentTable {
        &self.experiments
    }

    /// Full outcome table; failed experiments contribute no row here.
    #[must_use]
    pub fn outcomes(&self) -> &OutcomeTable {
        &self.outcomes
    }

    /// Combined view over successful experiments only, for analysis, in
    /// identity order.
    pub fn completed(&self) -> impl Iterator<Item = CompletedRow<'_>> {
        self.outcomes
            .ids
            .iter()
            .enumerate()
            .filter_map(|(outcome_row, id)| {
                self.experiments.row_of(*id).map(|experiment_row| CompletedRow {
                    store: self,
                    experiment_row,
                    outcome_row,
                })
            })
    }
}
