//! Core library for the `restrun` CLI.
//!
//! `restrun` takes a set of REST instances, users and request templates,
//! expands them into an instance x user x request x iteration matrix, and
//! dispatches every combination with bounded concurrency. Each exchange
//! becomes a [`sinks::RunResult`] written to the configured output sinks and
//! folded into thread-safe [`metrics::Statistics`] (counts, latency
//! percentiles, per-method/instance/user/status breakdowns).
//!
//! The HTTP exchange itself sits behind [`http::Transport`], so library
//! callers can swap in their own client.
pub mod args;
pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod shutdown;
pub mod sinks;
pub mod workload;
