//! WebSocket message types for the realtime invoice stream.
//!
//! # Protocol
//!
//! 1. Right after the upgrade the server sends [`WsServerMessage::Connected`].
//! 2. Every invoice event received from the node is then pushed as an
//!    [`InvoiceEventPayload`], unfiltered, to every connected peer.
//!
//! Client-to-server frames are ignored.

use serde::{Deserialize, Serialize};

use super::webhook::InvoiceEventPayload;

/// Server-to-client WebSocket message.
///
/// Both variants are JSON objects with a `"type"` field:
///
/// ```json
/// {"type":"CONNECTED"}
/// {"type":"INVOICE_PAID","invoiceId":"...", ...}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WsServerMessage {
    /// Connection acknowledgement, always the first frame.
    Connected,

    /// An invoice event, identical to the webhook body.
    #[serde(untagged)]
    Invoice(InvoiceEventPayload),
}
