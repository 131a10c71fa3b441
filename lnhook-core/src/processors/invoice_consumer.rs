//! InvoiceStreamConsumer processor.
//!
//! The InvoiceStreamConsumer is responsible for:
//! - Holding exactly one upstream invoice subscription open
//! - Normalizing each record into an `InvoiceEvent`
//! - Handing each event to the `FanoutDispatcher` and waiting for it before
//!   reading the next record
//! - Reconnecting after any stream termination, with backoff and a circuit
//!   breaker taken from the `ReconnectPolicy`
//!
//! The consumer never gives up. A circuit opening is logged at error level,
//! then the consumer waits the circuit delay and starts over.

use crate::config::ReconnectPolicy;
use crate::events::InvoiceEvent;
use crate::processors::dispatcher::FanoutDispatcher;
use crate::upstream::{InvoiceSource, SourceError};
use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Connection state of the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerState {
    Disconnected,
    Subscribing,
    Streaming,
}

impl std::fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumerState::Disconnected => write!(f, "disconnected"),
            ConsumerState::Subscribing => write!(f, "subscribing"),
            ConsumerState::Streaming => write!(f, "streaming"),
        }
    }
}

/// How a subscription session ended.
enum SessionEnd {
    Shutdown,
    Closed,
    Failed(SourceError),
}

/// Keeps the upstream invoice subscription alive and feeds the dispatcher.
pub struct InvoiceStreamConsumer<S> {
    source: S,
    dispatcher: FanoutDispatcher,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConsumerState>,
}

impl<S: InvoiceSource> InvoiceStreamConsumer<S> {
    /// Create a new InvoiceStreamConsumer.
    ///
    /// # Arguments
    ///
    /// * `source` - Upstream the subscription is opened on
    /// * `dispatcher` - Receives every normalized event
    /// * `policy` - Delays between subscription attempts
    pub fn new(source: S, dispatcher: FanoutDispatcher, policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(ConsumerState::Disconnected);
        Self {
            source,
            dispatcher,
            policy,
            state_tx,
        }
    }

    /// Watch the consumer's connection state.
    pub fn state(&self) -> watch::Receiver<ConsumerState> {
        self.state_tx.subscribe()
    }

    /// Run the consumer until shutdown is signaled.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("InvoiceStreamConsumer started");

        let mut failures: u32 = 0;
        loop {
            match self.session(&mut shutdown_rx, &mut failures).await {
                SessionEnd::Shutdown => break,
                SessionEnd::Closed => warn!("Invoice stream closed by upstream"),
                SessionEnd::Failed(e) => warn!(error = %e, "Invoice stream failed"),
            }
            self.state_tx.send_replace(ConsumerState::Disconnected);

            failures = failures.saturating_add(1);
            let delay = if self.policy.circuit_open(failures) {
                error!(
                    failures,
                    retry_in_secs = self.policy.circuit_open_delay.as_secs(),
                    "Invoice subscription keeps failing, circuit open"
                );
                failures = 0;
                self.policy.circuit_open_delay
            } else {
                self.policy.backoff(failures)
            };

            info!(failures, delay_ms = delay.as_millis() as u64, "Reconnecting to invoice stream");

            tokio::select! {
                biased;

                _ = shutdown_requested(&mut shutdown_rx) => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.state_tx.send_replace(ConsumerState::Disconnected);
        info!("InvoiceStreamConsumer shutdown complete");
    }

    /// Subscribe once and pump records until the stream ends.
    ///
    /// `failures` counts consecutive subscription attempts that never got
    /// established; it is reset as soon as the subscription is open.
    async fn session(
        &self,
        shutdown_rx: &mut watch::Receiver<bool>,
        failures: &mut u32,
    ) -> SessionEnd {
        self.state_tx.send_replace(ConsumerState::Subscribing);

        let subscribed = tokio::select! {
            biased;

            _ = shutdown_requested(shutdown_rx) => return SessionEnd::Shutdown,
            subscribed = self.source.subscribe() => subscribed,
        };
        let mut stream = match subscribed {
            Ok(stream) => stream,
            Err(e) => return SessionEnd::Failed(e),
        };

        *failures = 0;
        self.state_tx.send_replace(ConsumerState::Streaming);
        info!("Invoice subscription established");

        loop {
            let next = tokio::select! {
                biased;

                _ = shutdown_requested(shutdown_rx) => return SessionEnd::Shutdown,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(raw)) => {
                    let event = InvoiceEvent::from(raw);
                    debug!(
                        invoice_id = %event.invoice_id,
                        kind = %event.kind,
                        amount = event.amount,
                        "Received invoice update"
                    );
                    self.dispatcher.dispatch(&event).await;
                }
                Some(Err(e)) => {
                    if matches!(e, SourceError::Malformed(_)) {
                        error!(error = %e, "Malformed invoice record, dropping subscription");
                    }
                    return SessionEnd::Failed(e);
                }
                None => return SessionEnd::Closed,
            }
        }
    }
}

/// Resolves once shutdown is requested or the signal sender is gone.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
