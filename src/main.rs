// main.rs
// Binary entry point: partition the range, fan the squaring work out over the
// chunks, then report per-chunk results.
mod cli;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use cli::{CliArgs, RunConfig};
use scheduler::{partition, FanOutRunner, ResultMerger, SchedulerConfig};
use std::sync::Arc;
use telemetry::init_tracing;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_tracing(config.scheduler.debug)?;
    run(config.scheduler).await
}

async fn run(config: SchedulerConfig) -> anyhow::Result<()> {
    let partitioned = partition(config.max, config.chunks, config.policy)
        .context("failed to partition the range")?;
    let spans = partitioned.spans();
    let workload = Arc::new(config.workload()?);

    let runner = FanOutRunner::new(config.runner_config());
    let batch = runner.launch(partitioned.into_chunks(), workload);

    let idle = config.idle();
    if !idle.is_zero() {
        tracing::info!("Living my life, sleeping for {} millis...", idle.as_millis());
        tokio::time::sleep(idle).await;
        tracing::info!("Woke up!");
    }

    tracing::info!("I actually need the results now, waiting for all {} tasks", batch.len());
    let results = batch
        .join_all_or_cancel(ctrl_c())
        .await
        .context("chunk computation failed")?;

    let report = ResultMerger::new().merge(&spans, &results)?;
    report.log();
    report.to_table().printstd();
    Ok(())
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C signal");
}
