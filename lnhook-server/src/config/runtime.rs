//! Runtime configuration.
//!
//! Component settings are the core's own config types; only the listen
//! addresses are server-specific.

pub use lnhook_core::config::{DeliveryConfig, LndConfig, ReconnectPolicy};

use std::net::SocketAddr;

/// Listen addresses after CLI overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub realtime_listen: SocketAddr,
}
