//! Configuration loading, CLI overlay and validation.
mod apply;
mod loader;
pub mod types;
mod validate;

#[cfg(test)]
mod tests;

pub use apply::{OutputPlan, RunPlan, build_run_plan, default_session_id};
pub use loader::{load_config, load_config_file};
pub use validate::{MAX_INSTANCE_NAME_LENGTH, MAX_REQUEST_PATH_LENGTH, validate_runner};
