use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use tokio::sync::watch;

use crate::state::AppState;

/// `GET /` on the realtime listener - WebSocket event stream.
///
/// Every connected peer first receives `{"type":"CONNECTED"}` and then every
/// invoice event, whether or not anyone subscribed a webhook for it.
/// Messages from the peer are ignored.
pub async fn realtime_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_peer(socket, state))
}

/// Background task that drives a single WebSocket connection.
///
/// Forwards frames queued by the hub until the peer goes away or shutdown
/// is requested, then removes the peer from the hub.
async fn handle_peer(mut socket: WebSocket, state: AppState) {
    let mut peer = state.hub.connect().await;
    let peer_id = peer.id;
    let mut shutdown_rx = state.shutdown_rx.clone();
    tracing::info!(%peer_id, "WebSocket client connected");

    loop {
        tokio::select! {
            biased;

            _ = shutdown_requested(&mut shutdown_rx) => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }

            frame = peer.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = socket.send(Message::Text(frame.to_string().into())).await {
                    tracing::warn!(%peer_id, error = %e, "Realtime send failed");
                    break;
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(%peer_id, error = %e, "Realtime socket error");
                        break;
                    }
                }
            }
        }
    }

    state.hub.disconnect(peer_id).await;
    tracing::info!(%peer_id, "WebSocket client disconnected");
}

/// Resolves once shutdown is requested or the signal sender is gone.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
