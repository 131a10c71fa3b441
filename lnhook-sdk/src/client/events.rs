//! Realtime WebSocket client.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::ClientError;
use crate::objects::ws::WsServerMessage;

/// A connected realtime stream.
///
/// The first message is always [`WsServerMessage::Connected`]; every message
/// after that is an invoice event.
pub struct EventStreamClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventStreamClient {
    /// Connect to the relay's realtime endpoint (e.g. `ws://localhost:8080`).
    pub async fn connect(url: &Url) -> Result<Self, ClientError> {
        let (socket, _) = connect_async(url.as_str()).await?;
        Ok(Self { socket })
    }

    /// Wait for the next server message.
    ///
    /// Returns `Ok(None)` once the server closes the connection. Control
    /// frames are skipped.
    pub async fn next_message(&mut self) -> Result<Option<WsServerMessage>, ClientError> {
        while let Some(frame) = self.socket.next().await {
            match frame? {
                Message::Text(text) => return Ok(Some(serde_json::from_str(&text)?)),
                Message::Binary(bytes) => return Ok(Some(serde_json::from_slice(&bytes)?)),
                Message::Close(_) => return Ok(None),
                _ => continue,
            }
        }
        Ok(None)
    }

    /// Send a close frame and drop the connection.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }
}
