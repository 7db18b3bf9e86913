//! Run statistics: concurrent counters, latency percentiles and summaries.
mod statistics;
mod summary;


pub use statistics::{Category, Statistics};
pub use summary::StatisticsSummary;
