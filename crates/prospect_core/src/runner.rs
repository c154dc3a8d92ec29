//! Ensemble execution across a pool of worker threads.
//!
//! One producer-side cursor hands experiment indices to `W` worker threads;
//! each worker pulls, runs the model, and pushes its result over a bounded
//! channel to a single collector (the calling thread), which is the only
//! writer into the results store. Dispatch follows identity order;
//! completion order is unconstrained, and the store re-keys everything by
//! identity, so downstream analysis sees a stable table regardless of
//! scheduling.
//!
//! A model failure (error return or panic) is caught at the boundary of
//! that single experiment and recorded as a failure row; it never aborts
//! siblings. The only escalation from per-experiment to run-fatal is the
//! consecutive-failure threshold.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{EnsembleError, ModelFailure, StoreError};
use crate::model::{Experiment, ExperimentId, Outcome, Policy, Scenario};
use crate::store::ResultsStore;

/// The capability the runner consumes: run one scenario/policy pair and
/// return outcomes or a failure. Implementations must be safe to invoke
/// repeatedly and from multiple worker threads; adapter-specific
/// configuration travels through the scenario/policy values themselves.
pub trait Model: Send + Sync {
    fn run(&self, scenario: &Scenario, policy: &Policy) -> Result<Outcome, ModelFailure>;
}

impl<F> Model for F
where
    F: Fn(&Scenario, &Policy) -> Result<Outcome, ModelFailure> + Send + Sync,
{
    fn run(&self, scenario: &Scenario, policy: &Policy) -> Result<Outcome, ModelFailure> {
        self(scenario, policy)
    }
}

/// Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Worker threads; at most this many experiments are in flight.
    pub workers: usize,
    /// Abort the whole run once this many failures arrive consecutively.
    /// `None` disables the threshold.
    pub max_consecutive_failures: Option<usize>,
    /// After cancellation, how long to keep collecting in-flight results
    /// before abandoning them. `None` waits for all in-flight work.
    pub grace: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_consecutive_failures: None,
            grace: None,
        }
    }
}

fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Shared progress for an ensemble run: running totals plus the
/// cancellation flag, all behind `Arc`s so UIs and logging collaborators
/// can watch a run they did not start.
#[derive(Debug, Clone)]
pub struct EnsembleProgress {
    completed: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl EnsembleProgress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create from existing atomics (for embedding in a host UI).
    pub fn from_atomics(
        completed: Arc<AtomicUsize>,
        failed: Arc<AtomicUsize>,
        total: Arc<AtomicUsize>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            completed,
            failed,
            total,
            cancelled,
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Request cancellation: no new experiments are dispatched, in-flight
    /// work finishes (or is abandoned after the configured grace timeout).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }
}

impl Default for EnsembleProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolution status of a single experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentStatus {
    Success,
    Failure,
    Cancelled,
}

/// Emitted after each experiment resolves, for logging and progress-bar
/// collaborators. The runner itself never depends on the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub id: ExperimentId,
    pub status: ExperimentStatus,
    pub completed: usize,
    pub failed: usize,
}

/// Why a run stopped before draining its queue.
#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    /// The consecutive-failure threshold was crossed.
    ConsecutiveFailures { count: usize },
    /// The results store rejected a row, violating the identity invariant.
    Store(StoreError),
}

/// The outcome of a run. Partial results survive aborts and cancellations:
/// everything collected before the stop is in `store`.
#[derive(Debug)]
pub struct EnsembleResult {
    pub store: ResultsStore,
    pub completed: usize,
    pub failed: usize,
    /// Experiments never dispatched, plus in-flight work abandoned at the
    /// cancellation grace deadline.
    pub cancelled: usize,
    pub aborted: Option<AbortReason>,
}

/// Run every experiment against the model. See [`run_ensemble_with`].
pub fn run_ensemble<M>(
    model: Arc<M>,
    experiments: Vec<Experiment>,
    config: &RunnerConfig,
    progress: &EnsembleProgress,
) -> Result<EnsembleResult, EnsembleError>
where
    M: Model + ?Sized + 'static,
{
    run_ensemble_with(model, experiments, config, progress, |_| {})
}

/// Run every experiment against the model, invoking `on_event` after each
/// one resolves.
pub fn run_ensemble_with<M, F>(
    model: Arc<M>,
    experiments: Vec<Experiment>,
    config: &RunnerConfig,
    progress: &EnsembleProgress,
    mut on_event: F,
) -> Result<EnsembleResult, EnsembleError>
where
    M: Model + ?Sized + 'static,
    F: FnMut(&ProgressEvent),
{
    if config.workers == 0 {
        return Err(EnsembleError::InvalidWorkerCount);
    }

    let total = experiments.len();
    progress.reset(total);
    tracing::info!(
        experiments = total,
        workers = config.workers,
        "starting ensemble run"
    );

    let experiments: Arc<[Experiment]> = experiments.into();
    let cursor = Arc::new(AtomicUsize::new(0));
    // Raised on run-fatal aborts; cancellation travels through `progress`.
    let halt = Arc::new(AtomicBool::new(false));
    // Bounded to the pool width: a worker blocks on send until the
    // collector catches up, keeping at most W results outstanding.
    let (result_tx, result_rx) = mpsc::sync_channel::<(usize, Result<Outcome, ModelFailure>)>(
        config.workers,
    );

    let mut handles = Vec::with_capacity(config.workers);
    for _ in 0..config.workers {
        let model = Arc::clone(&model);
        let experiments = Arc::clone(&experiments);
        let cursor = Arc::clone(&cursor);
        let halt = Arc::clone(&halt);
        let progress = progress.clone();
        let tx = result_tx.clone();
        handles.push(thread::spawn(move || {
            loop {
                if halt.load(Ordering::SeqCst) || progress.is_cancelled() {
                    break;
                }
                let i = cursor.fetch_add(1, Ordering::SeqCst);
                if i >= experiments.len() {
                    break;
                }
                let result = run_one(model.as_ref(), &experiments[i]);
                if tx.send((i, result)).is_err() {
                    // Collector is gone: the run was aborted or abandoned.
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let mut store = ResultsStore::new();
    let mut completed = 0usize;
    let mut failed = 0usize;
    let mut consecutive = 0usize;
    let mut aborted: Option<AbortReason> = None;
    let mut deadline: Option<Instant> = None;
    let mut abandoned = false;

    const TICK: Duration = Duration::from_millis(25);

    loop {
        if deadline.is_none()
            && progress.is_cancelled()
            && let Some(grace) = config.grace
        {
            deadline = Some(Instant::now() + grace);
        }
        if let Some(d) = deadline
            && Instant::now() >= d
        {
            abandoned = true;
            tracing::warn!("grace timeout elapsed, abandoning in-flight experiments");
            break;
        }

        let (i, result) = match result_rx.recv_timeout(TICK) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let experiment = &experiments[i];
        let status = if result.is_ok() {
            ExperimentStatus::Success
        } else {
            ExperimentStatus::Failure
        };

        if let Err(store_error) = store.append(experiment, result.as_ref()) {
            halt.store(true, Ordering::SeqCst);
            tracing::warn!(error = %store_error, "results store rejected a row, aborting run");
            aborted = Some(AbortReason::Store(store_error));
            break;
        }

        match &result {
            Ok(_) => {
                completed += 1;
                progress.completed.fetch_add(1, Ordering::Relaxed);
                consecutive = 0;
            }
            Err(failure) => {
                failed += 1;
                progress.failed.fetch_add(1, Ordering::Relaxed);
                consecutive += 1;
                tracing::debug!(id = %experiment.id(), error = %failure, "experiment failed");
            }
        }
        on_event(&ProgressEvent {
            id: experiment.id(),
            status,
            completed,
            failed,
        });

        if let Some(threshold) = config.max_consecutive_failures
            && consecutive >= threshold
        {
            halt.store(true, Ordering::SeqCst);
            tracing::warn!(
                consecutive = consecutive,
                "aborting ensemble after consecutive failures"
            );
            aborted = Some(AbortReason::ConsecutiveFailures { count: consecutive });
            break;
        }
    }

    if aborted.is_some() || abandoned {
        // Receiver drops below; workers blocked in send or mid-run will see
        // the closed channel and exit on their own. Emit cancellation
        // events for dispatched-but-unrecorded experiments.
        let dispatched = cursor.load(Ordering::SeqCst).min(experiments.len());
        for experiment in &experiments[..dispatched] {
            if !store.contains(experiment.id()) {
                on_event(&ProgressEvent {
                    id: experiment.id(),
                    status: ExperimentStatus::Cancelled,
                    completed,
                    failed,
                });
            }
        }
    } else {
        for handle in handles {
            let _ = handle.join();
        }
    }

    let cancelled = total - completed - failed;
    tracing::info!(
        completed = completed,
        failed = failed,
        cancelled = cancelled,
        aborted = aborted.is_some(),
        "ensemble run finished"
    );

    Ok(EnsembleResult {
        store,
        completed,
        failed,
        cancelled,
        aborted,
    })
}

/// Execute one experiment, converting panics inside the adapter into
/// failure outcomes so a crashing model cannot take the pool down.
fn run_one<M>(model: &M, experiment: &Experiment) -> Result<Outcome, ModelFailure>
where
    M: Model + ?Sized,
{
    let guarded = panic::catch_unwind(AssertUnwindSafe(|| {
        model.run(experiment.scenario(), experiment.policy())
    }));
    match guarded {
        Ok(result) => result,
        Err(payload) => Err(ModelFailure::new(panic_reason(payload))),
    }
}

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("model panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("model panicked: {message}")
    } else {
        "model panicked".to_string()
    }
}
