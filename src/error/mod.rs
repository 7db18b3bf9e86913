mod app;
mod config;
mod dispatch;
mod http;
mod metrics;
mod panic_payload;
mod sink;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use dispatch::DispatchError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub(crate) use panic_payload::panic_message;
pub use sink::SinkError;
pub use validation::ValidationError;
