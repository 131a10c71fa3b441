//! TOML file configuration structures.
//!
//! These structs directly map to the `lnhook-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub lnd: LndConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address of the HTTP API (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Address of the realtime WebSocket server.
    #[serde(default = "default_realtime_addr")]
    pub realtime_listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            realtime_listen: default_realtime_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_realtime_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// LND node section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LndConfig {
    /// Base URL of the node's REST gateway.
    pub rest_url: String,
    /// Path to the macaroon file (binary, as written by lnd).
    pub macaroon_path: PathBuf,
    /// Path to the node's TLS certificate, if it is not publicly trusted.
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,
}

/// Delivery section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
    #[serde(default = "default_peer_queue_capacity")]
    pub peer_queue_capacity: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_timeout_secs: default_webhook_timeout_secs(),
            peer_queue_capacity: default_peer_queue_capacity(),
        }
    }
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

fn default_peer_queue_capacity() -> usize {
    64
}

/// Upstream reconnect section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    /// Consecutive failures before the circuit opens; 0 disables it.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_circuit_open_secs")]
    pub circuit_open_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
            circuit_open_secs: default_circuit_open_secs(),
        }
    }
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_max_delay_secs() -> u64 {
    300
}

fn default_multiplier() -> u32 {
    2
}

fn default_max_attempts() -> u32 {
    10
}

fn default_circuit_open_secs() -> u64 {
    600
}
