//! Webhook and realtime delivery configuration.

use std::time::Duration;

/// Default timeout for a single webhook POST.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-peer outbound queue length on the realtime channel.
pub const DEFAULT_PEER_QUEUE_CAPACITY: usize = 64;

/// Delivery settings shared by the dispatcher and the realtime hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Timeout for each webhook request, covering connect through body.
    pub webhook_timeout: Duration,
    /// Messages buffered per realtime peer before new ones are dropped
    /// for that peer.
    pub peer_queue_capacity: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
            peer_queue_capacity: DEFAULT_PEER_QUEUE_CAPACITY,
        }
    }
}
