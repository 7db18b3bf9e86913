use tracing::info;

/// Where a run is when a progress report is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Started,
    Running,
    Finished,
}

/// Point-in-time progress of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunProgress {
    pub phase: RunPhase,
    pub completed: u64,
    pub expected: u64,
    pub successful: u64,
    pub failed: u64,
    pub average_latency_ms: f64,
}

impl RunProgress {
    /// Completion percentage in `[0, 100]`; 100 for an empty run.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.expected == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.expected as f64 * 100.0).min(100.0)
    }
}

/// Receives fire-and-forget progress notifications from the dispatcher.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &RunProgress);
}

/// Default observer: one `tracing` line per report.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, progress: &RunProgress) {
        match progress.phase {
            RunPhase::Started => info!("Dispatching {} work items", progress.expected),
            RunPhase::Running => info!(
                "Progress: {}/{} ({:.1}%) ok={} failed={} avg={:.2}ms",
                progress.completed,
                progress.expected,
                progress.percent(),
                progress.successful,
                progress.failed,
                progress.average_latency_ms
            ),
            RunPhase::Finished => info!(
                "Finished {}/{} work items ok={} failed={}",
                progress.completed, progress.expected, progress.successful, progress.failed
            ),
        }
    }
}

/// Observer that drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _progress: &RunProgress) {}
}
