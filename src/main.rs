//! Mock API server (v1)
//!
//! Serves configured mock endpoints over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────┐
//!                         │                  MOCK SERVER                   │
//!                         │                                                │
//!   Client Request        │  ┌─────────┐    ┌──────────┐    ┌───────────┐  │
//!   ──────────────────────┼─▶│  http   │───▶│ dispatch │───▶│   store   │  │
//!   /mock/...             │  │ server  │    │  engine  │    │ (lookup + │  │
//!                         │  └─────────┘    └────┬─────┘    │  matcher) │  │
//!                         │                      │          └───────────┘  │
//!                         │                      ▼                         │
//!                         │               ┌────────────┐                   │
//!   Client Response       │               │ validation │                   │
//!   ◀─────────────────────┼───────────────│   engine   │                   │
//!                         │               └────────────┘                   │
//!                         │                                                │
//!   Admin Request         │  ┌─────────┐    ┌───────────┐   ┌───────────┐  │
//!   ──────────────────────┼─▶│  admin  │───▶│   store   │──▶│ flusher   │──┼──▶ endpoints.json
//!   /api/...              │  │   api   │    │ (mutate)  │   │ (debounce)│  │
//!                         │  └─────────┘    └───────────┘   └───────────┘  │
//!                         └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use mockapi::config::{load_config, ServerConfig};
use mockapi::lifecycle::{shutdown_signal, Shutdown};
use mockapi::observability::{init_logging, metrics};
use mockapi::store::EndpointRepository;
use mockapi::{HttpServer, PersistentStore};

#[derive(Parser)]
#[command(name = "mockapi")]
#[command(about = "Serve configurable mock HTTP endpoints", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    init_logging(&config.observability)?;

    tracing::info!("mockapi v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        traffic_prefix = %config.traffic.prefix,
        storage_path = %config.storage.path,
        flush_delay_ms = config.storage.flush_delay_ms,
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

    let shutdown = Shutdown::new();

    // Store must be loaded before traffic is accepted.
    let (store, flusher) = PersistentStore::open(&config.storage, shutdown.subscribe());
    let store: Arc<dyn EndpointRepository> = Arc::new(store);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store);
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    let server_result = tokio::select! {
        _ = shutdown_signal() => {
            shutdown.trigger();
            server_task.await?
        }
        result = &mut server_task => {
            shutdown.trigger();
            result?
        }
    };

    if let Err(e) = server_result {
        tracing::error!(error = %e, "HTTP server exited with error");
    }
    if let Err(e) = flusher.await {
        tracing::error!(error = %e, "Store flusher task failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
