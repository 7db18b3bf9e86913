use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::statistics::{Category, Statistics, percentile_of_sorted};

const MILLIS_PER_SECOND: u64 = 1000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;

/// Read-only snapshot of a run's [`Statistics`], suitable for printing and JSON export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub started_at: String,
    pub ended_at: Option<String>,
    pub duration_ms: i64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub requests_per_second: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub average_latency_ms: f64,
    pub p50_latency_ms: u64,
    pub p90_latency_ms: u64,
    pub p95_latency_ms: u64,
    pub p99_latency_ms: u64,
    pub requests_by_method: BTreeMap<String, u64>,
    pub requests_by_instance: BTreeMap<String, u64>,
    pub requests_by_user: BTreeMap<String, u64>,
    pub requests_by_status_code: BTreeMap<String, u64>,
}

impl Statistics {
    #[must_use]
    pub fn summary(&self) -> StatisticsSummary {
        let sorted = self.sorted_latencies();
        let average_latency_ms = if self.is_finalized() {
            self.average_latency_ms()
        } else {
            self.running_average_latency_ms()
        };
        StatisticsSummary {
            started_at: self.start_time().to_rfc3339(),
            ended_at: self.end_time().map(|ended_at| ended_at.to_rfc3339()),
            duration_ms: self
                .duration()
                .map_or(0, |elapsed| elapsed.num_milliseconds().max(0)),
            total_requests: self.total(),
            successful_requests: self.successful(),
            failed_requests: self.failed(),
            success_rate: self.success_rate(),
            requests_per_second: self.requests_per_second(),
            min_latency_ms: self.min_latency_ms(),
            max_latency_ms: self.max_latency_ms(),
            average_latency_ms,
            p50_latency_ms: percentile_of_sorted(&sorted, 50.0),
            p90_latency_ms: percentile_of_sorted(&sorted, 90.0),
            p95_latency_ms: percentile_of_sorted(&sorted, 95.0),
            p99_latency_ms: percentile_of_sorted(&sorted, 99.0),
            requests_by_method: self.category_counts(Category::Method),
            requests_by_instance: self.category_counts(Category::Instance),
            requests_by_user: self.category_counts(Category::User),
            requests_by_status_code: self.category_counts(Category::StatusCode),
        }
    }
}

impl StatisticsSummary {
    /// Human-readable end-of-run report, one entry per output line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.to_string(),
            format!(
                "Successful: {}  Failed: {}",
                self.successful_requests, self.failed_requests
            ),
            format!(
                "Latency (ms): min {}  p50 {}  p90 {}  p95 {}  p99 {}  max {}",
                self.min_latency_ms,
                self.p50_latency_ms,
                self.p90_latency_ms,
                self.p95_latency_ms,
                self.p99_latency_ms,
                self.max_latency_ms
            ),
        ];
        for (label, counts) in [
            ("By method", &self.requests_by_method),
            ("By instance", &self.requests_by_instance),
            ("By user", &self.requests_by_user),
            ("By status", &self.requests_by_status_code),
        ] {
            if !counts.is_empty() {
                lines.push(format!("{}: {}", label, format_counts(counts)));
            }
        }
        lines
    }
}

impl fmt::Display for StatisticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total Requests: {}, Success Rate: {:.2}%, Avg Response: {:.2}ms, Duration: {}, RPS: {:.2}",
            self.total_requests,
            self.success_rate,
            self.average_latency_ms,
            format_hms(self.duration_ms),
            self.requests_per_second
        )
    }
}

fn format_counts(counts: &BTreeMap<String, u64>) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("{}={}", key, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_hms(duration_ms: i64) -> String {
    let total_secs = u64::try_from(duration_ms)
        .unwrap_or(0)
        .saturating_div(MILLIS_PER_SECOND);
    let hours = total_secs.saturating_div(SECONDS_PER_HOUR);
    let minutes = total_secs
        .checked_rem(SECONDS_PER_HOUR)
        .unwrap_or(0)
        .saturating_div(SECONDS_PER_MINUTE);
    let seconds = total_secs.checked_rem(SECONDS_PER_MINUTE).unwrap_or(0);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
