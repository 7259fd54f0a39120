//! Remote configuration server.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                REMOTE CONFIG SERVER                  │
//!                 │                                                      │
//!  App request    │  ┌─────────┐   ┌──────────┐   ┌───────────────────┐  │
//!  ───────────────┼─▶│  http   │──▶│   auth   │──▶│ /config/{version} │  │
//!                 │  │ server  │   │   gate   │   │ /config/refresh   │  │
//!                 │  └─────────┘   └──────────┘   │ /assets/* (dev)   │  │
//!                 │                               └─────────┬─────────┘  │
//!                 │                                         │            │
//!                 │                                         ▼            │
//!                 │  ┌───────────┐  refresh  ┌─────────────────────────┐ │
//!                 │  │ scheduler │──────────▶│       ConfigStore       │ │
//!                 │  │ (+SIGHUP) │           │ fetch → validate → HEAD │ │
//!                 │  └───────────┘           │ sizes → atomic swap     │ │
//!                 │                          └────────────┬────────────┘ │
//!                 └───────────────────────────────────────┼──────────────┘
//!                                                         ▼
//!                                                    Asset host
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use remote_config_server::config::load_config;
use remote_config_server::http::HttpServer;
use remote_config_server::lifecycle::{signals, startup, Shutdown};
use remote_config_server::observability::{logging, metrics};
use remote_config_server::remote_config::{ConfigStore, RefreshScheduler};

#[derive(Parser)]
#[command(name = "remote-config-server")]
#[command(about = "Serves remote configuration for the mobile app", long_about = None)]
struct Args {
    /// Settings file (TOML). Defaults are used when it does not exist.
    #[arg(short, long, default_value = "config/server.toml")]
    config: PathBuf,

    /// Validate assets against their schemas and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load settings from {}: {}", args.config.display(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "remote-config-server starting");

    if let Err(e) = startup::validate_assets(&config.validation) {
        tracing::error!(error = %e, "Some files failed to pass validation. Exiting.");
        return Ok(ExitCode::FAILURE);
    }
    if args.check {
        return Ok(ExitCode::SUCCESS);
    }

    startup::warn_on_environment(&config);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        file_server = %config.file_server.base_url,
        refresh_interval_secs = config.refresh.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(ConfigStore::from_config(&config)?);
    let shutdown = Shutdown::new();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, store.clone());
    let server_handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    // The development asset server may be the document's host, so this runs
    // after the listener is up. Lookups answer 503 until a refresh succeeds.
    if let Err(e) = store.refresh().await {
        tracing::warn!(error = %e, "Initial configuration load failed, serving without configuration");
    }

    let scheduler = RefreshScheduler::new(
        store.clone(),
        Duration::from_secs(config.refresh.interval_secs),
    );
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown.subscribe()));

    signals::terminate().await;
    shutdown.trigger();

    server_handle.await??;
    scheduler_handle.await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
