//! fan_out_squares.rs
//!
//! Partitions a range, squares each chunk on its own task after a random
//! delay, keeps busy for a while, then awaits every result.
//!
//! ```bash
//! cargo run --example fan_out_squares
//! ```

use scheduler::{partition, FanOutRunner, RemainderPolicy, ResultMerger, SquareWorkload};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_thread_names(true)
        .init();

    let partitioned = partition(53, 5, RemainderPolicy::AdditionalChunk)?;
    let spans = partitioned.spans();

    let runner = FanOutRunner::default();
    let batch = runner.launch(partitioned.into_chunks(), Arc::new(SquareWorkload::default()));

    let delay = Duration::from_millis(1000);
    tracing::info!("Living my life, sleeping for {} millis...", delay.as_millis());
    tokio::time::sleep(delay).await;
    tracing::info!("Woke up!");

    let results = batch.join_all().await?;
    let report = ResultMerger::new().merge(&spans, &results)?;
    report.log();
    report.to_table().printstd();
    Ok(())
}
