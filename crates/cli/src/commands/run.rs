//! `run` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{processor_fn, CancellationToken, Item, ProcessorFunc};
use dispatcher::{DispatcherBuilder, DispatcherConfig};
use tracing::{info, warn};

use crate::cli::{Cli, RunArgs};
use crate::settings_resolver;

/// Execute the `run` command
pub async fn run_consumer(cli: &Cli, args: &RunArgs) -> Result<()> {
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let dispatcher = DispatcherBuilder::new(log_processor())
        .resolver(settings_resolver(cli)?)
        .config(dispatcher_config(args))
        .build()
        .context("Failed to create dispatcher")?;

    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            warn!("Received shutdown signal, stopping consumer...");
            cancel.cancel();
        }
    });

    info!(source = dispatcher.source_name(), "Starting consumer...");
    let result = dispatcher.consume(&cancel).await;
    signal_task.abort();

    result.context("Consumer failed")?;
    info!("tbq consumer finished");
    Ok(())
}

fn dispatcher_config(args: &RunArgs) -> DispatcherConfig {
    DispatcherConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        max_attempts: args.max_attempts,
        retry_backoff: Duration::from_millis(args.retry_backoff_ms),
        call_timeout: (args.call_timeout_ms > 0)
            .then(|| Duration::from_millis(args.call_timeout_ms)),
    }
}

/// Processor that logs a summary of each due item
fn log_processor() -> ProcessorFunc {
    processor_fn(|_cancel, item: Item| async move {
        match item.as_str() {
            Some(text) => info!(len = item.len(), payload = %text, "Item due"),
            None => info!(len = item.len(), "Item due (binary payload)"),
        }
        Ok(())
    })
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
