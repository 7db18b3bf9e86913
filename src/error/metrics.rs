use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Percentile must be between 0 and 100 (got {value}).")]
    PercentileOutOfRange { value: f64 },
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
