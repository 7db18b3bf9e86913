use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value for '{field}' must be >= {min}.")]
    ValueTooSmall { field: &'static str, min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Unknown HTTP verb '{value}'.")]
    UnknownVerb { value: String },
    #[error("At least one instance is required.")]
    NoInstances,
    #[error("At least one request is required.")]
    NoRequests,
    #[error("Missing iteration count (set --iterations or `iterations` in config).")]
    MissingIterations,
    #[error("Instance '{name}' has an invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Instance '{name}' base URL '{url}' must be absolute (http or https).")]
    BaseUrlNotAbsolute { name: String, url: String },
    #[error("Instance name '{name}' exceeds {max} characters.")]
    NameTooLong { name: String, max: usize },
    #[error("Request path exceeds {max} characters: '{path}'.")]
    PathTooLong { path: String, max: usize },
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
