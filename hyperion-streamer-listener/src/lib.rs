pub mod cli;
pub mod config;
pub mod consumer;
pub mod error;
pub mod filter;
pub mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{load_config, ListenerConfig};
use hyperion_streamer_connector::Streamer;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// The main entry point for running the listener application logic.
/// This function handles CLI parsing, configuration, and service startup.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Commands::Run(run_cmd) = cli.command;
    let config = load_config_from_cli(&run_cmd)?;
    hyperion_streamer_logger::init(&config.listener.log)?;
    tracing::info!("Configuration loaded: {:#?}", &config);

    let shutdown = CancellationToken::new();
    spawn_ctrl_c_handler(shutdown.clone());

    if let Err(e) = run_listener(config, shutdown).await {
        tracing::error!(error = %e, "error");
        return Err(e);
    }
    Ok(())
}

/// Loads the listener configuration and applies the CLI overrides on top.
fn load_config_from_cli(run_cmd: &cli::RunCmd) -> Result<ListenerConfig> {
    if let Some(config_path) = &run_cmd.config {
        eprintln!("Loading configuration from '{}'", config_path);
    } else {
        eprintln!("No config file provided, using default settings.");
    }
    let mut config = load_config(run_cmd.config.as_deref())?;
    run_cmd.apply(&mut config);
    Ok(config)
}

/// Cancels `shutdown` on the first Ctrl+C.
fn spawn_ctrl_c_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
                shutdown.cancel();
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for shutdown signal.");
            }
        }
    });
}

/// Streams actions to stdout until `shutdown` fires or the stream fails.
pub async fn run_listener(config: ListenerConfig, shutdown: CancellationToken) -> Result<()> {
    config.validate()?;
    let filters = filter::parse_filters(&config.listener.filter).context("get filter")?;
    let storage = storage::open_storage(&config.listener)?;

    let streamer = Streamer::new(Arc::new(config.connector))?;
    let stream = streamer
        .resume(storage.as_ref(), filters, &shutdown)
        .await
        .context("load state")?;

    let mut stdout = std::io::stdout();
    consumer::consume(
        stream,
        storage.as_ref(),
        &mut stdout,
        config.listener.progress_log_interval_blocks,
        &shutdown,
    )
    .await?;

    tracing::info!("Shutdown complete.");
    Ok(())
}
