//! Result records and the output sinks they are written to.
mod console;
mod csv;
mod fanout;
mod memory;
mod record;
mod summary;


use crate::error::SinkError;

pub use console::ConsoleSink;
pub use csv::CsvSink;
pub use fanout::FanoutSink;
pub use memory::MemorySink;
pub use record::RunResult;
pub use summary::write_summary_json;

/// Destination for run output.
///
/// Sinks are shared by every in-flight work item, so implementations
/// serialize their own writes.
pub trait OutputSink: Send + Sync {
    /// Records one result.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination rejects the write.
    fn write_result(&self, result: &RunResult) -> Result<(), SinkError>;

    /// Records free-text informational lines.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination rejects the write.
    fn write_lines(&self, lines: &[String]) -> Result<(), SinkError>;
}
