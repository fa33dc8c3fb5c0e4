//! A live WebSocket session and its outbound write path.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use futures_util::{Sink, SinkExt};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};

use crate::domain::{ClientId, OutboundClient};
use crate::error::SendError;
use crate::service::ApiHandles;

/// Write half of an upgraded socket.
type WsWriter = Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>;

/// Serializes `payload` into a single text frame.
fn encode_frame<T: Serialize + ?Sized>(payload: &T) -> Result<Message, SendError> {
    Ok(Message::text(serde_json::to_string(payload)?))
}

/// Network identity of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerInfo {
    /// TCP peer address.
    pub peer_addr: SocketAddr,
    /// Client IP, taken from proxy headers when present.
    pub client_ip: IpAddr,
}

/// One upgraded gateway connection.
///
/// Owns the socket's write half exclusively; all writes go through
/// [`GatewayClient::send_json`], which serializes them with a per-client
/// mutex. Once the handle is closed every later send fails with
/// [`SendError::Closed`].
pub struct GatewayClient {
    id: ClientId,
    peer: PeerInfo,
    connected_at: DateTime<Utc>,
    apis: ApiHandles,
    send_timeout: Option<Duration>,
    writer: Mutex<Option<WsWriter>>,
    closed: watch::Sender<bool>,
}

impl GatewayClient {
    /// Wraps the write half of a freshly upgraded socket.
    #[must_use]
    pub fn new(
        writer: impl Sink<Message, Error = axum::Error> + Send + 'static,
        peer: PeerInfo,
        apis: ApiHandles,
        send_timeout: Option<Duration>,
    ) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            id: ClientId::new(),
            peer,
            connected_at: Utc::now(),
            apis,
            send_timeout,
            writer: Mutex::new(Some(Box::pin(writer))),
            closed,
        }
    }

    /// Connection identifier.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Network identity of the connection.
    #[must_use]
    pub const fn peer(&self) -> PeerInfo {
        self.peer
    }

    /// When the upgrade completed.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Remote API handles bound to this connection.
    #[must_use]
    pub const fn apis(&self) -> &ApiHandles {
        &self.apis
    }

    /// Returns `false` once the handle has been closed or a write failed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !*self.closed.borrow()
    }

    /// Returns a receiver that flips to `true` when the handle closes.
    #[must_use]
    pub fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    /// Serializes `payload` to JSON and writes it as one text frame.
    ///
    /// A serialization failure leaves the connection untouched. A transport
    /// failure or timeout closes the handle, which ends the connection's
    /// read loop.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Serialization`], [`SendError::Closed`],
    /// [`SendError::Transport`] or [`SendError::Timeout`].
    pub async fn send_json<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), SendError> {
        let frame = encode_frame(payload)?;

        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(SendError::Closed)?;

        let write = writer.send(frame);
        let result = match self.send_timeout {
            Some(limit) => match tokio::time::timeout(limit, write).await {
                Ok(result) => result.map_err(|e| SendError::Transport(e.to_string())),
                Err(_) => Err(SendError::Timeout(limit)),
            },
            None => write.await.map_err(|e| SendError::Transport(e.to_string())),
        };

        if result.is_err() {
            guard.take();
            self.closed.send_replace(true);
        }
        result
    }

    /// Closes the write half, sending a close frame if the socket is still
    /// writable. Idempotent.
    pub async fn close(&self) {
        self.closed.send_replace(true);
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer
            && let Err(err) = writer.close().await
        {
            tracing::debug!(client_id = %self.id, error = %err, "error closing websocket");
        }
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("connected_at", &self.connected_at)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OutboundClient for GatewayClient {
    fn id(&self) -> ClientId {
        self.id
    }

    async fn send_message(&self, message: &Map<String, Value>) -> Result<(), SendError> {
        self.send_json(message).await
    }
}
