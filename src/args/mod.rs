//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;


pub use cli::RunnerArgs;

pub(crate) use parsers::{parse_duration_arg, parse_header};
