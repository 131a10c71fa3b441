//! lnhook server
//!
//! Relays LND invoice settlement and expiry events to registered webhooks
//! and to realtime WebSocket clients.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, ListenOverrides};
use lnhook_core::entities::SubscriptionRegistry;
use lnhook_core::processors::{FanoutDispatcher, InvoiceStreamConsumer, RealtimeHub};
use lnhook_core::upstream::LndRestClient;
use server::{build_realtime_router, build_router, run_server};
use shutdown::spawn_shutdown_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// lnhook - LND invoice webhook and WebSocket relay
#[derive(Parser, Debug)]
#[command(name = "lnhook-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "LNHOOK_CONFIG", default_value = "./lnhook-config.toml")]
    config: PathBuf,

    /// Override the API listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override the realtime WebSocket listen address (e.g., 0.0.0.0:8080)
    #[arg(short, long)]
    realtime_listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting lnhook-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(
        &args.config,
        ListenOverrides {
            listen: args.listen,
            realtime_listen: args.realtime_listen,
        },
    );
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let lnd = LndRestClient::new(&loaded_config.lnd).map_err(|e| {
        tracing::error!("Failed to build LND client: {}", e);
        e
    })?;

    // Wire the pipeline: consumer -> dispatcher -> webhooks + realtime peers
    let registry = SubscriptionRegistry::new();
    let hub = RealtimeHub::new(loaded_config.delivery.peer_queue_capacity);
    let dispatcher = FanoutDispatcher::new(registry.clone(), hub.clone(), &loaded_config.delivery);
    let consumer = InvoiceStreamConsumer::new(lnd.clone(), dispatcher, loaded_config.reconnect);
    let upstream = consumer.state();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    spawn_shutdown_handler(shutdown_tx.clone());

    let consumer_handle = tokio::spawn(consumer.run(shutdown_rx.clone()));

    let state = AppState::new(registry, hub, lnd, upstream, shutdown_rx.clone());

    tracing::info!("Starting HTTP server on {}", loaded_config.server.listen);
    tracing::info!(
        "Starting realtime server on {}",
        loaded_config.server.realtime_listen
    );
    let result = tokio::try_join!(
        run_server(
            build_router(state.clone()),
            loaded_config.server.listen,
            shutdown_rx.clone(),
        ),
        run_server(
            build_realtime_router(state),
            loaded_config.server.realtime_listen,
            shutdown_rx,
        ),
    );

    // Stop the consumer whether the servers exited cleanly or not
    shutdown_tx.send_replace(true);
    if let Err(e) = consumer_handle.await {
        tracing::error!("Invoice consumer task failed: {}", e);
    }
    tracing::info!("Server shutdown complete");

    result.map(|_| ()).map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
