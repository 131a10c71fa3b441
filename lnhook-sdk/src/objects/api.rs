//! Request and response bodies of the relay HTTP API.

use serde::{Deserialize, Serialize};

/// `POST /subscribe` request body.
///
/// Missing fields deserialize as empty strings so the server can answer with
/// its own "missing required fields" error instead of a JSON rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default)]
    pub webhook_endpoint: String,
}

/// `POST /subscribe` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    /// Number of subscriptions now held for the invoice, duplicates included.
    pub subscription_count: usize,
}

/// Error body returned with any 4xx/5xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `POST /create-invoice` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Amount in satoshis.
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// `POST /create-invoice` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
    /// BOLT-11 payment request.
    pub payment_request: String,
    /// Hex-encoded payment hash; use it as `invoiceId` when subscribing.
    pub r_hash: String,
}

/// `GET /health` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// State of the upstream invoice subscription.
    pub upstream: String,
    /// Number of invoices with at least one webhook subscription.
    pub subjects: usize,
    /// Total number of webhook subscriptions.
    pub subscriptions: usize,
}
