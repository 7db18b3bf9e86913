use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::HttpError;
use crate::workload::HttpVerb;

/// A fully resolved outbound exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub verb: HttpVerb,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// What came back from the remote end. Non-2xx statuses are ordinary responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Send-request capability used by the dispatcher.
///
/// Implementations must return `Ok` for every response the server produced,
/// whatever its status, and `Err` only when no response was obtained.
///
/// `cancel` is the run's cancellation signal. The dispatcher only hands over
/// items admitted before cancellation, so implementations may ignore it and
/// let the exchange finish.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, HttpError>;
}
