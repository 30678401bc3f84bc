//! API gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                   API GATEWAY                     │
//!   Client Request       │  ┌────────┐   ┌──────────┐   ┌───────────────┐    │
//!   ─────────────────────┼─▶│ server │──▶│ resolver │──▶│   identity    │────┼──▶ Identity
//!                        │  │ (axum) │   │ /svc/... │   │   enricher    │    │    Service
//!                        │  └────────┘   └──────────┘   └───────┬───────┘    │
//!                        │                                      ▼            │
//!   Client Response      │  ┌─────────────┐            ┌───────────────┐    │
//!   ◀────────────────────┼──│ interceptor │◀───────────│  forwarding   │◀───┼──▶ Backend
//!                        │  │ (mask 500s) │            │     proxy     │    │    Service
//!                        │  └─────────────┘            └───────────────┘    │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::load_config;
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::observability::{logging, metrics};
use api_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Path-prefix API gateway with identity enrichment", long_about = None)]
struct Cli {
    /// The port the gateway listens on [default: 8080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref(), std::env::vars())?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if let Some(addr) = cli.metrics_address {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = addr.to_string();
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        services = ?config.services,
        identity_service = ?config.identity.address,
        upstream_timeout_secs = config.timeouts.upstream_secs,
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

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
