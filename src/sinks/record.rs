use std::fmt;

use chrono::{DateTime, Local};

use crate::workload::HttpVerb;

/// Outcome of one dispatched work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub instance: String,
    pub user_name: String,
    pub verb: HttpVerb,
    pub request_path: String,
    pub success: bool,
    /// HTTP status as text, or a synthetic category such as `Error`.
    pub status_code: String,
    pub status_description: String,
    pub elapsed_ms: u64,
    pub content_fingerprint: Option<i32>,
    pub timestamp: DateTime<Local>,
    pub session_id: Option<String>,
    /// Response body text, kept only when content capture is enabled.
    pub content: Option<String>,
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fingerprint = self
            .content_fingerprint
            .map_or_else(String::new, |value| value.to_string());
        write!(
            f,
            "{}: {}: {}: {}: {}",
            self.success, self.instance, self.verb, self.request_path, fingerprint
        )
    }
}
