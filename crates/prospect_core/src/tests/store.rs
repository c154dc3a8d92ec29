//! Tests for the columnar results store and its identity invariant.

use crate::error::{ModelFailure, StoreError};
use crate::model::{ExperimentId, Outcome};
use crate::store::ResultsStore;
use crate::tests::experiment_with_u;

#[test]
fn test_append_success_fills_both_tables() {
    let mut store = ResultsStore::new();
    let experiment = experiment_with_u(0, 3.5);
    let outcome = Outcome::new().with_scalar("cost", 42.0);
    store.append(&experiment, Ok(&outcome)).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.outcomes().len(), 1);
    assert_eq!(store.is_failed(ExperimentId(0)), Some(false));
    assert_eq!(
        store.outcomes().scalar_column("cost").unwrap(),
        vec![Some(42.0)]
    );
    let u = store.experiments().value(0, "u").and_then(|v| v.as_real());
    assert_eq!(u, Some(3.5));
}

#[test]
fn test_append_failure_skips_outcome_table() {
    let mut store = ResultsStore::new();
    let failure = ModelFailure::new("solver diverged");
    store
        .append(&experiment_with_u(0, 1.0), Err(&failure))
        .unwrap();

    assert_eq!(store.len(), 1);
    assert!(store.outcomes().is_empty(), "failed rows contribute no outcome");
    assert_eq!(store.is_failed(ExperimentId(0)), Some(true));
    assert_eq!(store.experiments().failure_message(0), Some("solver diverged"));
}

#[test]
fn test_duplicate_identity_is_rejected_and_row_unchanged() {
    let mut store = ResultsStore::new();
    let experiment = experiment_with_u(7, 2.0);
    let outcome = Outcome::new().with_scalar("cost", 1.0);
    store.append(&experiment, Ok(&outcome)).unwrap();

    let failure = ModelFailure::new("retry");
    let result = store.append(&experiment_with_u(7, 9.0), Err(&failure));
    assert_eq!(result.unwrap_err(), StoreError::DuplicateResult(ExperimentId(7)));

    assert_eq!(store.len(), 1);
    assert_eq!(store.is_failed(ExperimentId(7)), Some(false));
    let u = store.experiments().value(0, "u").and_then(|v| v.as_real());
    assert_eq!(u, Some(2.0), "existing row must be left unchanged");
}

#[test]
fn test_rows_are_ordered_by_identity_not_arrival() {
    let mut store = ResultsStore::new();
    let outcome = Outcome::new().with_scalar("cost", 0.0);
    for id in [5u64, 1, 3, 0, 4, 2] {
        store
            .append(&experiment_with_u(id, id as f64), Ok(&outcome))
            .unwrap();
    }
    let ids: Vec<u64> = store.experiments().ids().iter().map(|id| id.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    let outcome_ids: Vec<u64> = store.outcomes().ids().iter().map(|id| id.0).collect();
    assert_eq!(outcome_ids, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_completed_view_excludes_failed_rows() {
    let mut store = ResultsStore::new();
    let outcome = Outcome::new().with_scalar("cost", 10.0);
    let failure = ModelFailure::new("boom");
    store.append(&experiment_with_u(0, 1.0), Ok(&outcome)).unwrap();
    store.append(&experiment_with_u(1, 2.0), Err(&failure)).unwrap();
    store.append(&experiment_with_u(2, 3.0), Ok(&outcome)).unwrap();

    let completed: Vec<u64> = store.completed().map(|row| row.id().0).collect();
    assert_eq!(completed, vec![0, 2]);
    assert_eq!(store.failed_ids().collect::<Vec<_>>(), vec![ExperimentId(1)]);
    assert_eq!(store.failed_count(), 1);
}

#[test]
fn test_outcome_columns_union_across_rows() {
    // Models may report different outcome sets; missing cells stay empty.
    let mut store = ResultsStore::new();
    let first = Outcome::new().with_scalar("cost", 1.0);
    let second = Outcome::new()
        .with_scalar("cost", 2.0)
        .with_series("trajectory", vec![1.0, 2.0, 3.0]);
    store.append(&experiment_with_u(0, 1.0), Ok(&first)).unwrap();
    store.append(&experiment_with_u(1, 2.0), Ok(&second)).unwrap();

    assert_eq!(
        store.outcomes().scalar_column("cost").unwrap(),
        vec![Some(1.0), Some(2.0)]
    );
    let trajectory = store.outcomes().column("trajectory").unwrap();
    assert!(trajectory[0].is_none());
    assert_eq!(
        trajectory[1].as_ref().and_then(|v| v.as_series()),
        Some(&[1.0, 2.0, 3.0][..])
    );
}

#[test]
fn test_outcome_row_view_lookup() {
    let mut store = ResultsStore::new();
    let outcome = Outcome::new().with_scalar("cost", 5.5);
    store.append(&experiment_with_u(3, 1.0), Ok(&outcome)).unwrap();

    let row = store.outcomes().row(0).unwrap();
    assert_eq!(row.id(), ExperimentId(3));
    assert_eq!(row.scalar("cost"), Some(5.5));
    assert_eq!(row.scalar("missing"), None);
}
