use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqlmon::config::{CommandLineArgs, Config};
use sqlmon::services::{
    ConsoleSender, FileDocumentStore, JsonSnapshotSource, MonitorTask, start_monitor_task,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli_args = CommandLineArgs::parse();

    // Load configuration first
    let config = Config::load(&cli_args)?;

    // Initialize logging
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);

    let registry = tracing_subscriber::registry().with(log_filter);

    // Keeps the non-blocking file writer flushing until main returns
    let mut _log_guard = None;

    // Add file logging if configured
    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path
            .parent()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .unwrap_or("logs");
        let file_name = log_path.file_name().and_then(|n| n.to_str()).unwrap_or("sqlmon.log");
        // Rolling appender adds the date suffix
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        _log_guard = Some(guard);
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init();
    }
    tracing::info!("sqlmon starting up");
    tracing::info!(
        "Snapshot dir: {}, documents dir: {}, categories: {:?}",
        config.source.snapshot_dir,
        config.store.documents_dir,
        config.monitor.categories
    );

    let task = MonitorTask::new(
        Arc::new(JsonSnapshotSource::new(&config.source.snapshot_dir)),
        Arc::new(FileDocumentStore::new(&config.store.documents_dir)),
        Arc::new(ConsoleSender::stdout()),
        config.monitor.categories.clone(),
    );

    if cli_args.once {
        task.run_cycle().await?;
        return Ok(());
    }

    let (shutdown, join) =
        start_monitor_task(task, config.monitor.interval_secs, config.monitor.run_on_startup);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested, waiting for the current cycle to finish");
    shutdown.store(true, Ordering::Relaxed);
    join.await?;

    tracing::info!("sqlmon stopped");
    Ok(())
}
