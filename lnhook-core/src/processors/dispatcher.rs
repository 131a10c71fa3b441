//! FanoutDispatcher processor.
//!
//! The FanoutDispatcher is responsible for:
//! - Looking up the webhook endpoints registered for an event's invoice
//! - POSTing the serialized event to each endpoint in its own task
//! - Broadcasting the same body to every realtime peer
//! - Waiting until every delivery has succeeded or failed
//!
//! Recipients are isolated from each other: a failing or slow endpoint only
//! costs its own delivery, bounded by the webhook timeout. Nothing is
//! retried and nothing is reported to the caller beyond the
//! [`DispatchReport`].

use crate::config::DeliveryConfig;
use crate::entities::subscription::SubscriptionRegistry;
use crate::events::InvoiceEvent;
use crate::processors::realtime_hub::{BroadcastReport, RealtimeHub};
use crate::processors::webhook_sender::WebhookSender;
use kanau::processor::Processor;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Webhooks that answered 2xx.
    pub delivered: usize,
    /// Webhooks that failed (non-2xx, timeout, network error).
    pub failed: usize,
    /// Realtime broadcast outcome.
    pub peers: BroadcastReport,
}

/// Delivers invoice events to webhooks and realtime peers.
#[derive(Debug, Clone)]
pub struct FanoutDispatcher {
    registry: SubscriptionRegistry,
    hub: RealtimeHub,
    sender: WebhookSender,
}

impl FanoutDispatcher {
    /// Create a new FanoutDispatcher.
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry queried for each event's endpoints
    /// * `hub` - Realtime hub every event is broadcast to
    /// * `config` - Delivery settings (webhook timeout)
    pub fn new(registry: SubscriptionRegistry, hub: RealtimeHub, config: &DeliveryConfig) -> Self {
        Self {
            registry,
            hub,
            sender: WebhookSender::new(config.webhook_timeout),
        }
    }

    /// Deliver `event` to every interested party and wait for all of them.
    pub async fn dispatch(&self, event: &InvoiceEvent) -> DispatchReport {
        let endpoints = self.registry.lookup(&event.invoice_id).await;

        let body: Arc<str> = match serde_json::to_string(&event.to_payload()) {
            Ok(body) => body.into(),
            Err(e) => {
                error!(invoice_id = %event.invoice_id, error = %e, "Failed to serialize event");
                return DispatchReport::default();
            }
        };

        debug!(
            invoice_id = %event.invoice_id,
            kind = %event.kind,
            subscribers = endpoints.len(),
            "Dispatching invoice event"
        );

        let mut deliveries = JoinSet::new();
        for endpoint in endpoints {
            let sender = self.sender.clone();
            let body = Arc::clone(&body);
            let invoice_id = event.invoice_id.clone();
            deliveries.spawn(async move {
                match sender.send(&endpoint, &body).await {
                    Ok(status) => {
                        info!(%invoice_id, %endpoint, status, "Webhook delivered");
                        true
                    }
                    Err(e) => {
                        warn!(
                            %invoice_id,
                            %endpoint,
                            timeout = e.is_timeout(),
                            error = %e,
                            "Webhook delivery failed"
                        );
                        false
                    }
                }
            });
        }

        let webhooks = async {
            let (mut delivered, mut failed) = (0, 0);
            while let Some(outcome) = deliveries.join_next().await {
                match outcome {
                    Ok(true) => delivered += 1,
                    Ok(false) => failed += 1,
                    Err(e) => {
                        error!(error = %e, "Webhook delivery task panicked");
                        failed += 1;
                    }
                }
            }
            (delivered, failed)
        };

        let (peers, (delivered, failed)) =
            tokio::join!(self.hub.broadcast(Arc::clone(&body)), webhooks);

        info!(
            invoice_id = %event.invoice_id,
            delivered,
            failed,
            peers = peers.delivered,
            "Invoice event dispatched"
        );

        DispatchReport {
            delivered,
            failed,
            peers,
        }
    }
}

impl Processor<InvoiceEvent> for FanoutDispatcher {
    type Output = DispatchReport;
    type Error = Infallible;
    #[tracing::instrument(skip_all, name = "FanoutDispatcher:Dispatch")]
    async fn process(&self, event: InvoiceEvent) -> Result<DispatchReport, Infallible> {
        Ok(self.dispatch(&event).await)
    }
}
