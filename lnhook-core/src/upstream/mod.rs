//! Upstream invoice sources.
//!
//! The consumer only needs "subscribe, then read a possibly infinite
//! sequence of invoice records". [`InvoiceSource`] captures exactly that so
//! the transport (LND REST today) stays swappable and tests can script the
//! stream.

pub mod lnd_rest;

pub use lnd_rest::LndRestClient;

use crate::events::RawInvoice;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// Stream of records from one open subscription.
///
/// The stream ends when the upstream closes it; an `Err` item is terminal
/// too, the consumer drops the stream and reconnects.
pub type InvoiceStream = BoxStream<'static, Result<RawInvoice, SourceError>>;

/// Errors that can occur while subscribing to or reading the upstream.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream reported an error inside the stream
    #[error("upstream stream error: {0}")]
    Upstream(String),

    /// A record could not be parsed or lacked required fields
    #[error("malformed invoice record: {0}")]
    Malformed(String),
}

/// A source of invoice updates.
#[async_trait]
pub trait InvoiceSource: Send + Sync {
    /// Open one subscription.
    ///
    /// Returns once the subscription is established; records then arrive
    /// through the returned stream.
    async fn subscribe(&self) -> Result<InvoiceStream, SourceError>;
}
