//! Application state shared across all request handlers.

use lnhook_core::entities::SubscriptionRegistry;
use lnhook_core::processors::{ConsumerState, RealtimeHub};
use lnhook_core::upstream::LndRestClient;
use tokio::sync::watch;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Webhook subscriptions, shared with the dispatcher.
    pub registry: SubscriptionRegistry,
    /// Realtime peers, shared with the dispatcher.
    pub hub: RealtimeHub,
    /// Node client used for invoice creation.
    pub lnd: LndRestClient,
    /// Current state of the upstream subscription.
    pub upstream: watch::Receiver<ConsumerState>,
    /// Flips to `true` once shutdown has been requested.
    pub shutdown_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        registry: SubscriptionRegistry,
        hub: RealtimeHub,
        lnd: LndRestClient,
        upstream: watch::Receiver<ConsumerState>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            registry,
            hub,
            lnd,
            upstream,
            shutdown_rx,
        }
    }

    /// Snapshot of the upstream state.
    pub fn upstream_state(&self) -> ConsumerState {
        *self.upstream.borrow()
    }
}
