use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Instance '{instance}' has no base URL.")]
    MissingBaseUrl { instance: String },
    #[error("Request processing panicked: {message}")]
    Panicked { message: String },
}
