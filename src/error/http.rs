use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid HTTP method '{method}'.")]
    InvalidMethod { method: String },
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
    #[error("{source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Other { message: String },
}

impl HttpError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::Transport { source } | HttpError::ReadBody { source } => source.is_timeout(),
            HttpError::BuildClientFailed { .. }
            | HttpError::InvalidProxy { .. }
            | HttpError::InvalidMethod { .. }
            | HttpError::InvalidHeader { .. }
            | HttpError::Other { .. } => false,
        }
    }
}
