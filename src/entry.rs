use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use crate::args::RunnerArgs;
use crate::config::{OutputPlan, build_run_plan, load_config};
use crate::dispatch::{Dispatcher, RunState};
use crate::error::{AppError, AppResult, ConfigError};
use crate::http::ReqwestTransport;
use crate::shutdown::setup_signal_shutdown_handler;
use crate::sinks::{ConsoleSink, CsvSink, FanoutSink, OutputSink, write_summary_json};

/// Binary entry point: parse arguments, set up logging and drive one run.
///
/// # Errors
///
/// Returns an error when configuration is missing or invalid, the runtime or
/// HTTP client cannot be built, or an output file cannot be opened or written.
pub fn run() -> AppResult<()> {
    let args = RunnerArgs::parse();
    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: RunnerArgs) -> AppResult<()> {
    let config = load_config(args.config.as_deref())?
        .ok_or_else(|| AppError::config(ConfigError::NotFound))?;
    let plan = build_run_plan(&config, &args)?;

    let (fanout, csv) = build_sink(&plan.output).await?;
    let sink: Arc<dyn OutputSink> = Arc::new(fanout);
    let transport = Arc::new(ReqwestTransport::new(&plan.client)?);
    let dispatcher = Dispatcher::new(transport, Arc::clone(&sink), plan.dispatch.clone());

    let cancel = tokio_util::sync::CancellationToken::new();
    let signal_handle = setup_signal_shutdown_handler(&cancel);
    let outcome = dispatcher
        .execute(&plan.runner, plan.iterations, &cancel)
        .await;
    cancel.cancel();
    if let Err(err) = signal_handle.await {
        warn!("Signal handler ended abnormally: {}", err);
    }
    if let Some(csv) = csv.as_ref() {
        match csv.close().await {
            Ok(rows) => info!("{} results written to {}", rows, csv.path().display()),
            Err(err) => error!("Failed to finish {}: {}", csv.path().display(), err),
        }
    }
    let report = outcome?;

    let summary = report.statistics.summary();
    let lines = summary.lines();
    if plan.output.console {
        if let Err(err) = sink.write_lines(&lines) {
            error!("Failed to print summary: {}", err);
        }
    } else {
        for line in &lines {
            info!("{}", line);
        }
    }

    if let Some(path) = plan.output.summary_json.as_deref() {
        write_summary_json(path, &summary).await?;
        info!("Summary written to {}", path.display());
    }

    if report.state == RunState::Cancelled {
        warn!(
            "Run cancelled: {} of {} work items were never dispatched",
            report.not_dispatched(),
            report.expected
        );
    }
    Ok(())
}

/// Builds the fan-out sink, handing back the CSV sink so it can be closed.
async fn build_sink(output: &OutputPlan) -> AppResult<(FanoutSink, Option<Arc<CsvSink>>)> {
    let mut sink = FanoutSink::default();
    if output.console {
        sink.push(Arc::new(ConsoleSink::stdout(output.no_color)));
    }
    let csv = match output.csv.as_ref() {
        Some(path) => {
            let csv = Arc::new(CsvSink::open(path.clone(), output.include_content).await?);
            sink.push(Arc::clone(&csv) as Arc<dyn OutputSink>);
            Some(csv)
        }
        None => None,
    };
    Ok((sink, csv))
}
