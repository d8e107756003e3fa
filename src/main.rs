// provenance-processor - ingests syscall provenance records and emits
// per-job summaries of the files each job read, wrote, and executed.
//
// Architecture:
// - HTTP receiver (axum): accepts POST /log batches
// - Parser: validates the wire format into a typed ParsedRequest
// - Queue: mutex-guarded hand-off between HTTP handler tasks and the processor
// - Processor: the single-task reducer that folds requests into job summaries
// - Sink: renders completed summaries to stdout on job End

mod cli;
mod config;
mod logging;
mod model;
mod parser;
mod processor;
mod queue;
mod server;
mod sink;
mod startup;

use anyhow::Result;
use config::Config;
use queue::RequestQueue;
use sink::StdoutSink;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    if cli::handle_cli() {
        return Ok(());
    }

    Config::ensure_config_exists();
    let config = Config::from_env();

    logging::init(&config);
    startup::print_startup(&config);
    tracing::info!("starting provenance-processor");

    let queue = Arc::new(RequestQueue::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let processor_handle = tokio::spawn(processor::run(
        queue.clone(),
        Box::new(StdoutSink),
        Duration::from_millis(config.drain_interval_ms),
        shutdown_rx.clone(),
    ));

    let server_config = config.clone();
    let server_queue = queue.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::serve(&server_config, server_queue, shutdown_rx).await {
            tracing::error!("http receiver failed: {e}");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining...");
    let _ = shutdown_tx.send(true);

    let _ = server_handle.await;
    let _ = processor_handle.await;

    tracing::info!("shutdown complete");
    Ok(())
}
