use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// The filter comes from `RESTRUN_LOG`, then `RUST_LOG`, else `info`
/// (`debug` when `verbose`). Later calls are silent no-ops.
pub fn init_logging(verbose: bool, no_color: bool) {
    if let Err(err) = install_subscriber(verbose, no_color) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// Returns `Ok(false)` when a global subscriber is already in place.
fn install_subscriber(verbose: bool, no_color: bool) -> Result<bool, SetGlobalDefaultError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let filter = std::env::var("RESTRUN_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(true)
}
