//! Processors of the invoice relay.
//!
//! - `InvoiceStreamConsumer`: Holds the upstream subscription, emits `InvoiceEvent`
//! - `FanoutDispatcher`: Receives `InvoiceEvent`, delivers webhooks and broadcasts
//! - `WebhookSender`: Sends a single webhook POST
//! - `RealtimeHub`: Tracks realtime peers and broadcasts to them

pub mod dispatcher;
pub mod invoice_consumer;
pub mod realtime_hub;
pub mod webhook_sender;

pub use dispatcher::{DispatchReport, FanoutDispatcher};
pub use invoice_consumer::{ConsumerState, InvoiceStreamConsumer};
pub use realtime_hub::{BroadcastReport, CONNECTED_ACK, PeerHandle, PeerId, RealtimeHub};
pub use webhook_sender::{WebhookError, WebhookSender};
