use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use futures_util::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{DispatchError, panic_message};
use crate::http::{Transport, TransportResponse};
use crate::metrics::{Category, Statistics};
use crate::sinks::{OutputSink, RunResult};
use crate::workload::{WorkItem, content_fingerprint, merge_placeholders};

use super::progress::{ProgressObserver, RunPhase, RunProgress};
use super::resolve::ResolvedRequest;

/// Status category for transport failures (no response obtained).
pub const ERROR_STATUS: &str = "Error";
/// Status category for failures inside item processing itself.
pub const EXCEPTION_STATUS: &str = "Exception";
pub(crate) const UNKNOWN_INSTANCE: &str = "Unknown";

/// Shared, read-only state handed to every item task of one run.
pub(crate) struct ItemContext {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) sink: Arc<dyn OutputSink>,
    pub(crate) progress: Arc<dyn ProgressObserver>,
    pub(crate) statistics: Arc<Statistics>,
    pub(crate) cancel: CancellationToken,
    pub(crate) capture_content: bool,
    pub(crate) progress_interval: u64,
    pub(crate) expected: u64,
    pub(crate) completed: AtomicU64,
}

impl ItemContext {
    pub(crate) fn report(&self, phase: RunPhase) {
        self.progress.on_progress(&RunProgress {
            phase,
            completed: self.completed.load(Ordering::Relaxed),
            expected: self.expected,
            successful: self.statistics.successful(),
            failed: self.statistics.failed(),
            average_latency_ms: self.statistics.running_average_latency_ms(),
        });
    }
}

/// Runs one admitted work item to its terminal state.
///
/// Every outcome produces exactly one result that lands in the statistics
/// and is offered to the sink.
pub(crate) async fn run_item(ctx: &ItemContext, item: WorkItem) {
    let outcome = AssertUnwindSafe(execute(ctx, &item)).catch_unwind().await;
    let result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            let err = DispatchError::Panicked {
                message: panic_message(payload.as_ref()),
            };
            error!("Work item for {} failed: {}", item.instance.name, err);
            failure_result(&item, merged_path(&item), EXCEPTION_STATUS, err.to_string(), 0)
        }
    };
    record(ctx, &result);
}

async fn execute(ctx: &ItemContext, item: &WorkItem) -> RunResult {
    let resolved = match ResolvedRequest::resolve(item) {
        Ok(resolved) => resolved,
        Err(err) => {
            warn!("Could not resolve request for {}: {}", item.instance.name, err);
            return failure_result(item, merged_path(item), EXCEPTION_STATUS, err.to_string(), 0);
        }
    };
    let path = resolved.path.clone();

    let started = Instant::now();
    let outcome = ctx
        .transport
        .send(resolved.into_transport_request(), &ctx.cancel)
        .await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(response) => response_result(item, path, response, elapsed_ms, ctx.capture_content),
        Err(err) => {
            warn!(
                "{} {}{} failed: {}",
                item.request.verb,
                item.instance.base_url.as_deref().unwrap_or_default(),
                path,
                err
            );
            failure_result(item, path, ERROR_STATUS, err.to_string(), elapsed_ms)
        }
    }
}

fn record(ctx: &ItemContext, result: &RunResult) {
    let stats = &ctx.statistics;
    stats.increment_total();
    if result.success {
        stats.increment_success();
    } else {
        stats.increment_failure();
    }
    stats.record_latency(result.elapsed_ms);
    stats.bump_category(Category::Method, result.verb.as_str());
    stats.bump_category(Category::Instance, instance_key(&result.instance));
    stats.bump_category(Category::User, &result.user_name);
    stats.bump_category(Category::StatusCode, &result.status_code);

    let completed = ctx.completed.fetch_add(1, Ordering::Relaxed).saturating_add(1);

    match catch_unwind(AssertUnwindSafe(|| ctx.sink.write_result(result))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!("Failed to write result: {}", err),
        Err(payload) => error!(
            "Output sink panicked while writing a result: {}",
            panic_message(payload.as_ref())
        ),
    }

    if ctx.progress_interval > 0 && completed.checked_rem(ctx.progress_interval) == Some(0) {
        ctx.report(RunPhase::Running);
    }
}

fn response_result(
    item: &WorkItem,
    path: String,
    response: TransportResponse,
    elapsed_ms: u64,
    capture_content: bool,
) -> RunResult {
    let success = response.is_success();
    let content_fingerprint = response.body.as_deref().map(|body| content_fingerprint(Some(body)));
    RunResult {
        instance: item.instance.name.clone(),
        user_name: item.user.user_name.clone(),
        verb: item.request.verb,
        request_path: path,
        success,
        status_code: response.status.to_string(),
        status_description: response.reason.unwrap_or_default(),
        elapsed_ms,
        content_fingerprint,
        timestamp: Local::now(),
        session_id: item.instance.session_id.clone(),
        content: if capture_content { response.body } else { None },
    }
}

fn failure_result(
    item: &WorkItem,
    path: String,
    status: &str,
    description: String,
    elapsed_ms: u64,
) -> RunResult {
    RunResult {
        instance: item.instance.name.clone(),
        user_name: item.user.user_name.clone(),
        verb: item.request.verb,
        request_path: path,
        success: false,
        status_code: status.to_owned(),
        status_description: description,
        elapsed_ms,
        content_fingerprint: None,
        timestamp: Local::now(),
        session_id: item.instance.session_id.clone(),
        content: None,
    }
}

fn merged_path(item: &WorkItem) -> String {
    merge_placeholders(Some(item.request.path.as_str()), &item.user)
}

fn instance_key(name: &str) -> &str {
    if name.is_empty() { UNKNOWN_INSTANCE } else { name }
}
