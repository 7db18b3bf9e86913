use std::path::Path;

use crate::error::SinkError;
use crate::metrics::StatisticsSummary;

/// Persists the final statistics as pretty JSON, replacing any existing file.
///
/// # Errors
///
/// Returns an error when the summary cannot be serialized or written.
pub async fn write_summary_json(path: &Path, summary: &StatisticsSummary) -> Result<(), SinkError> {
    let json = serde_json::to_vec_pretty(summary)
        .map_err(|err| SinkError::SerializeSummary { source: err })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|err| SinkError::WriteSummary {
            path: path.to_path_buf(),
            source: err,
        })
}
