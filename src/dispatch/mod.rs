//! Bounded-concurrency dispatch of work items.
//!
//! The [`Dispatcher`] admits at most `max_concurrency` items at a time through
//! a semaphore, runs each admitted item on its own task, and folds every
//! outcome into the shared [`Statistics`] and the output sink. Cancellation is
//! cooperative: it is checked before a slot is acquired and again once the
//! slot is held. Nothing suspends between that second check and the transport
//! call, so every admitted item finishes and produces a result.
mod item;
mod progress;
mod resolve;


use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, ValidationError};
use crate::http::Transport;
use crate::metrics::Statistics;
use crate::sinks::OutputSink;
use crate::workload::{Runner, WorkItems, expand};

use item::{ItemContext, run_item};

pub use item::{ERROR_STATUS, EXCEPTION_STATUS};
pub use progress::{NoProgress, ProgressObserver, RunPhase, RunProgress, TracingProgress};
pub use resolve::{
    AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE, ResolvedRequest, SESSION_HEADER,
};

pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub max_concurrency: usize,
    /// Completions between progress reports; 0 reports only start and finish.
    pub progress_interval: u64,
    /// Keep response bodies on results.
    pub capture_content: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            capture_content: false,
        }
    }
}

/// Run-level terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Completed,
    Cancelled,
}

/// What happened to a run once every admitted item settled.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: RunState,
    /// Items in the expanded matrix.
    pub expected: u64,
    /// Items that acquired a concurrency slot.
    pub dispatched: u64,
    /// Items that produced a result; equals `dispatched` once the run returns.
    pub completed: u64,
    pub statistics: Arc<Statistics>,
}

impl RunReport {
    /// Items never admitted because the run was cancelled first.
    #[must_use]
    pub const fn not_dispatched(&self) -> u64 {
        self.expected.saturating_sub(self.dispatched)
    }
}

pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn OutputSink>,
    progress: Arc<dyn ProgressObserver>,
    settings: DispatchSettings,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn OutputSink>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            transport,
            sink,
            progress: Arc::new(TracingProgress),
            settings,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Validates the matrix, expands it and dispatches every item.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is dispatched when there are
    /// no instances, no requests, or zero iterations.
    pub async fn execute(
        &self,
        runner: &Runner,
        iterations: u64,
        cancel: &CancellationToken,
    ) -> AppResult<RunReport> {
        if runner.instances.is_empty() {
            return Err(AppError::validation(ValidationError::NoInstances));
        }
        if runner.requests.is_empty() {
            return Err(AppError::validation(ValidationError::NoRequests));
        }
        if iterations == 0 {
            return Err(AppError::validation(ValidationError::ValueTooSmall {
                field: "iterations",
                min: 1,
            }));
        }
        if runner.users.is_empty() {
            warn!("No users configured; the run will dispatch no work items.");
        }

        let items = expand(runner, iterations);
        Ok(self
            .dispatch(items, Arc::new(Statistics::new()), cancel)
            .await)
    }

    /// Dispatches pre-expanded items, feeding `statistics` and the sink.
    ///
    /// Statistics are finalized exactly once, after all admitted items settled.
    pub async fn dispatch(
        &self,
        items: WorkItems,
        statistics: Arc<Statistics>,
        cancel: &CancellationToken,
    ) -> RunReport {
        let expected = items.total();
        let max_concurrency = self.settings.max_concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        let ctx = Arc::new(ItemContext {
            transport: Arc::clone(&self.transport),
            sink: Arc::clone(&self.sink),
            progress: Arc::clone(&self.progress),
            statistics: Arc::clone(&statistics),
            cancel: cancel.clone(),
            capture_content: self.settings.capture_content,
            progress_interval: self.settings.progress_interval,
            expected,
            completed: AtomicU64::new(0),
        });

        info!(
            "Starting run: {} work items, concurrency {}",
            expected, max_concurrency
        );
        ctx.report(RunPhase::Started);

        let mut tasks = JoinSet::new();
        let mut dispatched: u64 = 0;
        let mut state = RunState::Completed;

        for item in items {
            if cancel.is_cancelled() {
                state = RunState::Cancelled;
                break;
            }
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    state = RunState::Cancelled;
                    break;
                }
                acquired = Arc::clone(&semaphore).acquire_owned() => match acquired {
                    Ok(permit) => permit,
                    Err(err) => {
                        error!("Concurrency limiter closed: {}", err);
                        state = RunState::Cancelled;
                        break;
                    }
                },
            };
            if cancel.is_cancelled() {
                drop(permit);
                state = RunState::Cancelled;
                break;
            }

            dispatched = dispatched.saturating_add(1);
            let ctx = Arc::clone(&ctx);
            tasks.spawn(async move {
                let _permit = permit;
                run_item(&ctx, item).await;
            });

            while let Some(joined) = tasks.try_join_next() {
                log_join_failure(&joined);
            }
        }

        if state == RunState::Cancelled {
            info!(
                "Run cancelled after admitting {} of {} work items; waiting for in-flight items",
                dispatched, expected
            );
        }
        while let Some(joined) = tasks.join_next().await {
            log_join_failure(&joined);
        }

        statistics.finalize();
        ctx.report(RunPhase::Finished);
        let completed = ctx.completed.load(Ordering::Relaxed);
        info!(
            "Run finished: {} completed, {} succeeded, {} failed",
            completed,
            statistics.successful(),
            statistics.failed()
        );

        RunReport {
            state,
            expected,
            dispatched,
            completed,
            statistics,
        }
    }
}

fn log_join_failure(joined: &Result<(), JoinError>) {
    if let Err(err) = joined {
        error!("Work item task ended abnormally: {}", err);
    }
}
