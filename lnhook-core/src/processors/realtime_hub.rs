//! RealtimeHub.
//!
//! The RealtimeHub is responsible for:
//! - Tracking connected realtime peers
//! - Queueing the connection acknowledgement for every new peer
//! - Broadcasting every serialized event to every peer, unfiltered
//!
//! Each peer owns a bounded queue drained by its socket task. Broadcasting
//! never waits on a peer: when a queue is full the message is dropped for
//! that peer only and the peer stays connected; when a queue is closed the
//! peer is gone and is removed.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Connection acknowledgement, queued before anything else.
pub const CONNECTED_ACK: &str = r#"{"type":"CONNECTED"}"#;

/// Identifier of a connected peer.
pub type PeerId = Uuid;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Peers the message was queued for.
    pub delivered: usize,
    /// Peers whose queue was full; they miss this message.
    pub dropped: usize,
    /// Peers found closed and removed.
    pub removed: usize,
}

/// Receiving side of one peer, held by its socket task.
#[derive(Debug)]
pub struct PeerHandle {
    pub id: PeerId,
    rx: mpsc::Receiver<Arc<str>>,
}

impl PeerHandle {
    /// Next message for this peer, or `None` once the hub dropped it.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }
}

/// Registry of realtime peers with fan-out broadcasting.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    peers: Arc<RwLock<HashMap<PeerId, mpsc::Sender<Arc<str>>>>>,
    queue_capacity: usize,
}

impl RealtimeHub {
    /// Create a hub whose peers buffer up to `queue_capacity` messages.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            peers: Arc::new(RwLock::new(HashMap::new())),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new peer. Its first message is [`CONNECTED_ACK`].
    pub async fn connect(&self) -> PeerHandle {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        // Fresh channel with capacity >= 1, cannot be full.
        let _ = tx.try_send(Arc::from(CONNECTED_ACK));

        let id = Uuid::now_v7();
        let total = {
            let mut peers = self.peers.write().await;
            peers.insert(id, tx);
            peers.len()
        };
        debug!(peer = %id, total, "Realtime peer connected");

        PeerHandle { id, rx }
    }

    /// Forget a peer. Called by its socket task on disconnect.
    pub async fn disconnect(&self, id: PeerId) {
        if self.peers.write().await.remove(&id).is_some() {
            debug!(peer = %id, "Realtime peer disconnected");
        }
    }

    /// Number of currently connected peers.
    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Queue `message` for every connected peer.
    ///
    /// Never fails and never blocks on a slow peer.
    pub async fn broadcast(&self, message: Arc<str>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        {
            let peers = self.peers.read().await;
            for (id, tx) in peers.iter() {
                match tx.try_send(Arc::clone(&message)) {
                    Ok(()) => report.delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(peer = %id, "Realtime peer queue full, dropping event");
                        report.dropped += 1;
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        warn!(peer = %id, "Realtime peer gone, removing");
                        closed.push(*id);
                    }
                }
            }
        }

        if !closed.is_empty() {
            let mut peers = self.peers.write().await;
            for id in &closed {
                peers.remove(id);
            }
            report.removed = closed.len();
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnhook_sdk::objects::WsServerMessage;

    #[test]
    fn test_connected_ack_matches_wire_type() {
        assert_eq!(
            serde_json::to_string(&WsServerMessage::Connected).unwrap(),
            CONNECTED_ACK
        );
    }

    #[tokio::test]
    async fn test_new_peer_receives_ack_first() {
        let hub = RealtimeHub::new(8);
        let mut peer = hub.connect().await;
        hub.broadcast(Arc::from("event")).await;

        assert_eq!(peer.recv().await.as_deref(), Some(CONNECTED_ACK));
        assert_eq!(peer.recv().await.as_deref(), Some("event"));
    }

    #[tokio::test]
    async fn test_gone_peer_does_not_affect_others() {
        let hub = RealtimeHub::new(8);
        let mut a = hub.connect().await;
        let gone = hub.connect().await;
        let mut c = hub.connect().await;
        drop(gone);

        let report = hub.broadcast(Arc::from("event")).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(hub.peer_count().await, 2);

        for peer in [&mut a, &mut c] {
            assert_eq!(peer.recv().await.as_deref(), Some(CONNECTED_ACK));
            assert_eq!(peer.recv().await.as_deref(), Some("event"));
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_for_that_peer_only() {
        let hub = RealtimeHub::new(2);
        // Never drained: holds the ack, then one event, then is full.
        let mut slow = hub.connect().await;
        let mut fast = hub.connect().await;

        for i in 0..3 {
            let report = hub.broadcast(Arc::from(format!("event-{i}"))).await;
            if i == 0 {
                assert_eq!(report.delivered, 2);
            } else {
                assert_eq!(report.delivered, 1);
                assert_eq!(report.dropped, 1);
            }
            // Keep the fast peer drained.
            let first = fast.recv().await;
            if i == 0 {
                assert_eq!(first.as_deref(), Some(CONNECTED_ACK));
                assert_eq!(fast.recv().await.as_deref(), Some("event-0"));
            } else {
                assert_eq!(first.as_deref(), Some(format!("event-{i}").as_str()));
            }
        }

        // The slow peer is still connected and kept what fit.
        assert_eq!(hub.peer_count().await, 2);
        assert_eq!(slow.recv().await.as_deref(), Some(CONNECTED_ACK));
        assert_eq!(slow.recv().await.as_deref(), Some("event-0"));
    }

    #[tokio::test]
    async fn test_disconnect_removes_peer() {
        let hub = RealtimeHub::new(4);
        let peer = hub.connect().await;
        assert_eq!(hub.peer_count().await, 1);
        hub.disconnect(peer.id).await;
        assert_eq!(hub.peer_count().await, 0);
        assert_eq!(hub.broadcast(Arc::from("x")).await, BroadcastReport::default());
    }
}
