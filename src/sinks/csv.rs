use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::SinkError;

use super::{OutputSink, RunResult};

const BASE_COLUMNS: [&str; 10] = [
    "Verb",
    "Instance",
    "LastRunDate",
    "Duration",
    "Request",
    "ResultCode",
    "SessionId",
    "StatusDescription",
    "Success",
    "UserName",
];
const CONTENT_COLUMN: &str = "Content";
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Appends one CSV row per result to a file, writing the header only for new files.
///
/// Rows are formatted on the caller's task and handed to a single writer
/// task, so item tasks never block on file I/O. Call [`CsvSink::close`] to
/// wait until every queued row is on disk.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    include_content: bool,
    rows: Mutex<Option<mpsc::UnboundedSender<String>>>,
    writer: Mutex<Option<JoinHandle<Result<u64, SinkError>>>>,
}

impl CsvSink {
    /// Opens `path` for appending and starts the writer task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the header cannot be written.
    pub async fn open(path: impl Into<PathBuf>, include_content: bool) -> Result<Self, SinkError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|err| SinkError::Open {
                path: path.clone(),
                source: err,
            })?;
        let is_new = file
            .metadata()
            .await
            .map_err(|err| SinkError::Open {
                path: path.clone(),
                source: err,
            })?
            .len()
            == 0;

        let mut writer = BufWriter::new(file);
        if is_new {
            let header = format!("{}\n", header_row(include_content));
            writer
                .write_all(header.as_bytes())
                .await
                .map_err(|err| SinkError::WriteCsv { source: err })?;
            writer
                .flush()
                .await
                .map_err(|err| SinkError::WriteCsv { source: err })?;
        }

        let (rows_tx, rows_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_rows(writer, rows_rx));
        Ok(Self {
            path,
            include_content,
            rows: Mutex::new(Some(rows_tx)),
            writer: Mutex::new(Some(handle)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops accepting rows and waits for the writer task to drain the queue.
    ///
    /// Returns the number of rows written since [`CsvSink::open`]; a second
    /// call returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns the writer task's I/O error, or a join error if it panicked.
    pub async fn close(&self) -> Result<u64, SinkError> {
        drop(self.rows.lock().take());
        let handle = self.writer.lock().take();
        let Some(handle) = handle else {
            return Ok(0);
        };
        let written = handle
            .await
            .map_err(|err| SinkError::WriterTask { source: err })??;
        debug!("Wrote {} CSV rows to {}", written, self.path.display());
        Ok(written)
    }
}

impl OutputSink for CsvSink {
    fn write_result(&self, result: &RunResult) -> Result<(), SinkError> {
        let row = format_row(result, self.include_content);
        let rows = self.rows.lock();
        let sent = rows.as_ref().is_some_and(|sender| sender.send(row).is_ok());
        if sent {
            Ok(())
        } else {
            Err(SinkError::Closed {
                path: self.path.clone(),
            })
        }
    }

    fn write_lines(&self, _lines: &[String]) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Drains queued rows into the file until every sender is gone.
///
/// The buffer is flushed whenever the queue runs empty, so rows reach the
/// file while the run is still going.
async fn write_rows(
    mut writer: BufWriter<File>,
    mut rows: mpsc::UnboundedReceiver<String>,
) -> Result<u64, SinkError> {
    let mut written: u64 = 0;
    while let Some(mut row) = rows.recv().await {
        row.push('\n');
        writer
            .write_all(row.as_bytes())
            .await
            .map_err(|err| SinkError::WriteCsv { source: err })?;
        written = written.saturating_add(1);
        if rows.is_empty() {
            writer
                .flush()
                .await
                .map_err(|err| SinkError::WriteCsv { source: err })?;
        }
    }
    writer
        .flush()
        .await
        .map_err(|err| SinkError::WriteCsv { source: err })?;
    Ok(written)
}

pub(crate) fn header_row(include_content: bool) -> String {
    let mut columns: Vec<&str> = BASE_COLUMNS.to_vec();
    if include_content {
        columns.push(CONTENT_COLUMN);
    }
    columns.join(",")
}

pub(crate) fn format_row(result: &RunResult, include_content: bool) -> String {
    let timestamp = result.timestamp.format(TIMESTAMP_FORMAT).to_string();
    let elapsed = result.elapsed_ms.to_string();
    let success = if result.success { "True" } else { "False" };
    let mut fields = vec![
        escape_field(result.verb.as_str()),
        escape_field(&result.instance),
        escape_field(&timestamp),
        escape_field(&elapsed),
        escape_field(&result.request_path),
        escape_field(&result.status_code),
        escape_field(result.session_id.as_deref().unwrap_or_default()),
        escape_field(&result.status_description),
        escape_field(success),
        escape_field(&result.user_name),
    ];
    if include_content {
        let content = if result.success {
            result.content.as_deref().unwrap_or_default()
        } else {
            ""
        };
        fields.push(escape_field(content));
    }
    fields.join(",")
}

/// Quotes a field when it holds a delimiter, quote or line break, doubling inner quotes.
pub(crate) fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
