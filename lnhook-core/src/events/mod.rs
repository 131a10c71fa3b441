//! Invoice events flowing from the node to webhooks and realtime peers.
//!
//! # Event Flow
//!
//! 1. An `InvoiceSource` yields `RawInvoice` records
//! 2. `InvoiceStreamConsumer` normalizes them into `InvoiceEvent`
//! 3. `FanoutDispatcher` delivers each event to registered webhooks and
//!    broadcasts it through the `RealtimeHub`
//!
//! Delivery is at-least-once and possibly duplicated: re-settled invoices
//! and duplicate subscriptions both produce repeated webhook calls.

pub mod types;

pub use types::{InvoiceEvent, InvoiceEventKind, RawInvoice};
