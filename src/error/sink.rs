use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open output '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV row: {source}")]
    WriteCsv {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write console output: {source}")]
    WriteConsole {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize summary: {source}")]
    SerializeSummary {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write summary '{path}': {source}")]
    WriteSummary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV output '{path}' is closed.")]
    Closed { path: PathBuf },
    #[error("CSV writer task failed: {source}")]
    WriterTask {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Sink panicked: {message}")]
    Panicked { message: String },
    #[error("{failed} of {total} sinks failed; first error: {first}")]
    Fanout {
        failed: usize,
        total: usize,
        first: Box<SinkError>,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
