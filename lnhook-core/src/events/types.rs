//! Invoice event type definitions.
//!
//! A [`RawInvoice`] is what an upstream source yields; an [`InvoiceEvent`]
//! is the normalized form handed to the dispatcher. Every upstream record
//! produces exactly one event, so a re-settled invoice shows up twice.

use lnhook_sdk::objects::{InvoiceEventPayload, InvoiceEventType};

/// Invoice record as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInvoice {
    /// Payment hash bytes.
    pub r_hash: Vec<u8>,
    /// Value in satoshis.
    pub value: i64,
    pub memo: String,
    pub settled: bool,
    pub settle_date: i64,
    pub creation_date: i64,
}

/// What happened to the invoice.
///
/// Derived from the `settled` flag only: anything not settled is reported
/// as expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceEventKind {
    Paid,
    Expired,
}

impl InvoiceEventKind {
    pub fn from_settled(settled: bool) -> Self {
        if settled {
            InvoiceEventKind::Paid
        } else {
            InvoiceEventKind::Expired
        }
    }
}

impl From<InvoiceEventKind> for InvoiceEventType {
    fn from(value: InvoiceEventKind) -> Self {
        match value {
            InvoiceEventKind::Paid => InvoiceEventType::InvoicePaid,
            InvoiceEventKind::Expired => InvoiceEventType::InvoiceExpired,
        }
    }
}

impl std::fmt::Display for InvoiceEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceEventKind::Paid => write!(f, "paid"),
            InvoiceEventKind::Expired => write!(f, "expired"),
        }
    }
}

/// A normalized invoice notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceEvent {
    /// Hex-encoded payment hash.
    pub invoice_id: String,
    pub kind: InvoiceEventKind,
    pub amount: i64,
    pub memo: String,
    pub settled: bool,
    pub settle_date: i64,
    pub creation_date: i64,
}

impl From<RawInvoice> for InvoiceEvent {
    fn from(raw: RawInvoice) -> Self {
        Self {
            invoice_id: hex::encode(&raw.r_hash),
            kind: InvoiceEventKind::from_settled(raw.settled),
            amount: raw.value,
            memo: raw.memo,
            settled: raw.settled,
            settle_date: raw.settle_date,
            creation_date: raw.creation_date,
        }
    }
}

impl InvoiceEvent {
    /// Build the JSON body delivered to webhooks and realtime peers.
    pub fn to_payload(&self) -> InvoiceEventPayload {
        InvoiceEventPayload {
            event_type: self.kind.into(),
            invoice_id: self.invoice_id.clone(),
            amount: self.amount,
            memo: self.memo.clone(),
            settled: self.settled,
            settle_date: self.settle_date,
            creation_date: self.creation_date,
        }
    }
}
