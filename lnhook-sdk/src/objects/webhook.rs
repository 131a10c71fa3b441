//! Webhook payload for invoice events.
//!
//! The same JSON object is POSTed to every registered webhook endpoint and
//! pushed to every realtime WebSocket peer.

use serde::{Deserialize, Serialize};

/// Invoice event body.
///
/// ```json
/// {
///   "type": "INVOICE_PAID",
///   "invoiceId": "deadbeef",
///   "amount": 1000,
///   "memo": "coffee",
///   "settled": true,
///   "settleDate": 1700000100,
///   "creationDate": 1700000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEventPayload {
    #[serde(rename = "type")]
    pub event_type: InvoiceEventType,
    /// Hex-encoded payment hash.
    pub invoice_id: String,
    /// Invoice value in satoshis.
    pub amount: i64,
    pub memo: String,
    pub settled: bool,
    pub settle_date: i64,
    pub creation_date: i64,
}

/// Event type discriminator carried in the `"type"` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceEventType {
    InvoicePaid,
    InvoiceExpired,
}

impl std::fmt::Display for InvoiceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceEventType::InvoicePaid => write!(f, "INVOICE_PAID"),
            InvoiceEventType::InvoiceExpired => write!(f, "INVOICE_EXPIRED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_field_names() {
        let payload = InvoiceEventPayload {
            event_type: InvoiceEventType::InvoiceExpired,
            invoice_id: "abc".to_string(),
            amount: 21,
            memo: String::new(),
            settled: false,
            settle_date: 0,
            creation_date: 1_700_000_000,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "INVOICE_EXPIRED",
                "invoiceId": "abc",
                "amount": 21,
                "memo": "",
                "settled": false,
                "settleDate": 0,
                "creationDate": 1_700_000_000
            })
        );
    }

    #[test]
    fn test_event_type_display_matches_wire() {
        let wire = serde_json::to_string(&InvoiceEventType::InvoicePaid).unwrap();
        assert_eq!(wire, format!("\"{}\"", InvoiceEventType::InvoicePaid));
    }
}
