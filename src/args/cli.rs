use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};

#[derive(Debug, Parser, Clone, Default)]
#[clap(
    name = "restrun",
    version,
    about = "Runs every request template for every user against every instance, concurrently, and reports latency and outcome statistics."
)]
pub struct RunnerArgs {
    /// Path to config file (TOML/JSON). Defaults to ./restrun.toml or ./restrun.json if present.
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Number of passes over the instance x user x request matrix
    #[arg(long, short = 'i', value_parser = parse_positive_u64)]
    pub iterations: Option<u64>,

    /// Maximum number of requests in flight at once
    #[arg(long = "concurrency", short = 'C', value_parser = parse_positive_usize)]
    pub concurrency: Option<usize>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Connection timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg)]
    pub connect_timeout: Option<Duration>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Append results to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Include response bodies of successful requests in the CSV output
    #[arg(long = "include-content")]
    pub include_content: bool,

    /// Write the final statistics summary as JSON to this path
    #[arg(long = "summary-json")]
    pub summary_json: Option<PathBuf>,

    /// Do not print per-request lines to stdout
    #[arg(long = "no-console")]
    pub no_console: bool,

    /// Disable coloured console output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by RESTRUN_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
