//! In-memory webhook subscription registry.
//!
//! Subscriptions live for the lifetime of the process and are lost on
//! restart. Entries are only ever appended: there is no unsubscribe, and a
//! `(invoice_id, endpoint)` pair registered twice is stored (and notified)
//! twice.

use kanau::processor::Processor;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// A single webhook registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub invoice_id: String,
    pub endpoint: Url,
}

/// Shared handle to the subscription map.
///
/// Cloning is cheap and every clone sees the same entries. Appends happen
/// under the write lock, so a concurrent [`lookup`](Self::lookup) sees
/// either the list before or after an append, never a partial one.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<RwLock<HashMap<String, Vec<Url>>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `endpoint` to the subscriptions of `invoice_id`.
    ///
    /// Returns how many subscriptions that invoice now has. The endpoint is
    /// not validated here; `Url` already guarantees it parsed.
    pub async fn register(&self, subscription: Subscription) -> usize {
        let mut map = self.inner.write().await;
        let endpoints = map.entry(subscription.invoice_id).or_default();
        endpoints.push(subscription.endpoint);
        endpoints.len()
    }

    /// Snapshot of the endpoints registered for `invoice_id`, in registration
    /// order. Unknown invoices yield an empty list.
    pub async fn lookup(&self, invoice_id: &str) -> Vec<Url> {
        self.inner
            .read()
            .await
            .get(invoice_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of invoices with at least one subscription.
    pub async fn subject_count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Total number of subscriptions across all invoices.
    pub async fn subscription_total(&self) -> usize {
        self.inner.read().await.values().map(Vec::len).sum()
    }
}

/// Register a webhook endpoint for an invoice.
#[derive(Debug, Clone)]
pub struct RegisterSubscription {
    pub invoice_id: String,
    pub endpoint: Url,
}

impl Processor<RegisterSubscription> for SubscriptionRegistry {
    type Output = usize;
    type Error = Infallible;
    #[tracing::instrument(skip_all, name = "Registry:RegisterSubscription")]
    async fn process(&self, cmd: RegisterSubscription) -> Result<usize, Infallible> {
        let count = self
            .register(Subscription {
                invoice_id: cmd.invoice_id,
                endpoint: cmd.endpoint,
            })
            .await;
        Ok(count)
    }
}

/// Get the endpoints registered for an invoice.
#[derive(Debug, Clone)]
pub struct LookupSubscriptions {
    pub invoice_id: String,
}

impl Processor<LookupSubscriptions> for SubscriptionRegistry {
    type Output = Vec<Url>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, name = "Registry:LookupSubscriptions")]
    async fn process(&self, query: LookupSubscriptions) -> Result<Vec<Url>, Infallible> {
        Ok(self.lookup(&query.invoice_id).await)
    }
}
