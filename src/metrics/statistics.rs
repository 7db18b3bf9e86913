use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::MetricsError;

const PERCENT_MAX: f64 = 100.0;
const MILLIS_PER_SECOND: f64 = 1000.0;

/// Categorical breakdowns kept by [`Statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Method,
    Instance,
    User,
    StatusCode,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Method,
        Category::Instance,
        Category::User,
        Category::StatusCode,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Method => "method",
            Category::Instance => "instance",
            Category::User => "user",
            Category::StatusCode => "status_code",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Finalized {
    ended_at: DateTime<Utc>,
    average_latency_ms: f64,
}

/// Run-scoped counters, latencies and breakdowns shared by every in-flight work item.
///
/// All mutators take `&self` and are safe to call from any number of tasks
/// without outside locking: counters are atomics, min/max use
/// compare-and-swap loops, the latency bag is an append-only vector behind a
/// short-lived lock and the category maps are sharded concurrent maps.
/// [`Statistics::finalize`] is meant to run once, after all work settled.
#[derive(Debug)]
pub struct Statistics {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    min_latency_ms: AtomicU64,
    max_latency_ms: AtomicU64,
    latency_sum_ms: AtomicU64,
    latencies: Mutex<Vec<u64>>,
    by_method: DashMap<String, u64>,
    by_instance: DashMap<String, u64>,
    by_user: DashMap<String, u64>,
    by_status_code: DashMap<String, u64>,
    started_at: DateTime<Utc>,
    finalized: Mutex<Option<Finalized>>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    #[must_use]
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    #[must_use]
    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            total: AtomicU64::new(0),
            successful: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            min_latency_ms: AtomicU64::new(u64::MAX),
            max_latency_ms: AtomicU64::new(0),
            latency_sum_ms: AtomicU64::new(0),
            latencies: Mutex::new(Vec::new()),
            by_method: DashMap::new(),
            by_instance: DashMap::new(),
            by_user: DashMap::new(),
            by_status_code: DashMap::new(),
            started_at,
            finalized: Mutex::new(None),
        }
    }

    pub fn increment_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_success(&self) {
        self.successful.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Appends a latency sample and folds it into the running min/max.
    pub fn record_latency(&self, latency_ms: u64) {
        self.latencies.lock().push(latency_ms);
        self.latency_sum_ms.fetch_add(latency_ms, Ordering::Relaxed);

        let mut current_min = self.min_latency_ms.load(Ordering::Relaxed);
        while latency_ms < current_min {
            match self.min_latency_ms.compare_exchange_weak(
                current_min,
                latency_ms,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current_min = observed,
            }
        }

        let mut current_max = self.max_latency_ms.load(Ordering::Relaxed);
        while latency_ms > current_max {
            match self.max_latency_ms.compare_exchange_weak(
                current_max,
                latency_ms,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current_max = observed,
            }
        }
    }

    /// Adds one to `key` in the given breakdown, creating it at 1.
    pub fn bump_category(&self, category: Category, key: &str) {
        self.category_map(category)
            .entry(key.to_owned())
            .and_modify(|count| *count = count.saturating_add(1))
            .or_insert(1);
    }

    /// Latency at percentile `p` using the ceiling-rank rule on a sorted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::PercentileOutOfRange`] when `p` is outside `[0, 100]`.
    pub fn percentile(&self, p: f64) -> Result<u64, MetricsError> {
        if !(0.0..=PERCENT_MAX).contains(&p) {
            return Err(MetricsError::PercentileOutOfRange { value: p });
        }
        let sorted = self.sorted_latencies();
        Ok(percentile_of_sorted(&sorted, p))
    }

    /// Stamps the end time and computes the mean latency.
    pub fn finalize(&self) {
        let average_latency_ms = mean(&self.latencies.lock());
        *self.finalized.lock() = Some(Finalized {
            ended_at: Utc::now(),
            average_latency_ms,
        });
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn successful(&self) -> u64 {
        self.successful.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn min_latency_ms(&self) -> u64 {
        match self.min_latency_ms.load(Ordering::Relaxed) {
            u64::MAX => 0,
            value => value,
        }
    }

    #[must_use]
    pub fn max_latency_ms(&self) -> u64 {
        self.max_latency_ms.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn latency_count(&self) -> usize {
        self.latencies.lock().len()
    }

    /// Mean latency computed by [`Statistics::finalize`]; 0 before that.
    #[must_use]
    pub fn average_latency_ms(&self) -> f64 {
        self.finalized
            .lock()
            .map_or(0.0, |finalized| finalized.average_latency_ms)
    }

    /// Mean latency over the samples recorded so far, without sorting or copying the bag.
    #[must_use]
    pub fn running_average_latency_ms(&self) -> f64 {
        let count = self.latency_count();
        if count == 0 {
            return 0.0;
        }
        self.latency_sum_ms.load(Ordering::Relaxed) as f64 / count as f64
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.successful() as f64 / total as f64 * PERCENT_MAX
    }

    #[must_use]
    pub fn requests_per_second(&self) -> f64 {
        let Some(elapsed) = self.duration() else {
            return 0.0;
        };
        let elapsed_secs = elapsed.num_milliseconds() as f64 / MILLIS_PER_SECOND;
        if elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.total() as f64 / elapsed_secs
    }

    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.finalized.lock().map(|finalized| finalized.ended_at)
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized.lock().is_some()
    }

    /// Time between start and end; `None` until finalized.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end_time()
            .map(|ended_at| ended_at.signed_duration_since(self.started_at))
    }

    /// Sorted copy of one breakdown.
    #[must_use]
    pub fn category_counts(&self, category: Category) -> BTreeMap<String, u64> {
        self.category_map(category)
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub(crate) fn sorted_latencies(&self) -> Vec<u64> {
        let mut snapshot = self.latencies.lock().clone();
        snapshot.sort_unstable();
        snapshot
    }

    const fn category_map(&self, category: Category) -> &DashMap<String, u64> {
        match category {
            Category::Method => &self.by_method,
            Category::Instance => &self.by_instance,
            Category::User => &self.by_user,
            Category::StatusCode => &self.by_status_code,
        }
    }
}

/// Ceiling-rank percentile over an ascending slice; 0 for an empty slice.
pub(crate) fn percentile_of_sorted(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let count = sorted.len() as f64;
    let rank = (p / PERCENT_MAX * count).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len().saturating_sub(1));
    sorted.get(index).copied().unwrap_or(0)
}

fn mean(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: u128 = samples.iter().map(|value| u128::from(*value)).sum();
    sum as f64 / samples.len() as f64
}
