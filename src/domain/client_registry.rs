//! Process-wide registry of connected gateway clients.
//!
//! [`ClientRegistry`] keeps every registered client in registration order
//! behind a [`tokio::sync::RwLock`]. Registration and removal take the write
//! lock briefly; senders take a snapshot under the read lock and release it
//! before touching any connection, so a slow client never blocks new
//! handshakes.
//!
//! Sends are only as bounded as the clients make them. A gateway client
//! stops waiting on a peer that has quit reading once `WS_SEND_TIMEOUT_SECS`
//! elapses; with the timeout off (the default) such a send, and any
//! [`ClientRegistry::broadcast`] that includes it, can wait indefinitely.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};

use super::{ClientId, DisconnectReason, EventBus, GatewayEvent, OutboundClient};
use crate::error::{RegistryError, SendError};

/// Outcome of [`ClientRegistry::broadcast`].
#[derive(Debug, Default)]
pub struct BroadcastReport {
    /// Number of clients the message was written to.
    pub delivered: usize,
    /// Clients whose send failed, with the failure.
    pub failed: Vec<(ClientId, SendError)>,
}

/// Membership of all connections that are upgraded but not yet closed.
///
/// # Concurrency
///
/// - Registrations from concurrent handshakes are serialized by the lock.
/// - Enumeration returns a snapshot; sends happen outside the lock.
/// - Writes to a single client are serialized by the client itself.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: RwLock<Vec<Arc<dyn OutboundClient>>>,
    events: EventBus,
}

impl ClientRegistry {
    /// Creates an empty registry publishing lifecycle events on `events`.
    #[must_use]
    pub fn new(events: EventBus) -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Appends a client and publishes [`GatewayEvent::ClientConnected`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if a client with the same
    /// id is already present.
    pub async fn register(&self, client: Arc<dyn OutboundClient>) -> Result<(), RegistryError> {
        let client_id = client.id();
        {
            let mut clients = self.clients.write().await;
            if clients.iter().any(|c| c.id() == client_id) {
                return Err(RegistryError::AlreadyRegistered(client_id));
            }
            clients.push(client);
        }
        let _ = self.events.publish(GatewayEvent::ClientConnected {
            client_id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Removes a client, publishing [`GatewayEvent::ClientDisconnected`] if it
    /// was present.
    pub async fn deregister(
        &self,
        client_id: ClientId,
        reason: DisconnectReason,
    ) -> Option<Arc<dyn OutboundClient>> {
        let removed = {
            let mut clients = self.clients.write().await;
            let position = clients.iter().position(|c| c.id() == client_id)?;
            clients.remove(position)
        };
        let _ = self.events.publish(GatewayEvent::ClientDisconnected {
            client_id,
            reason,
            timestamp: Utc::now(),
        });
        Some(removed)
    }

    /// Looks up a registered client.
    pub async fn get(&self, client_id: ClientId) -> Option<Arc<dyn OutboundClient>> {
        self.clients
            .read()
            .await
            .iter()
            .find(|c| c.id() == client_id)
            .map(Arc::clone)
    }

    /// Returns a snapshot of all registered clients in registration order.
    pub async fn clients(&self) -> Vec<Arc<dyn OutboundClient>> {
        self.clients.read().await.iter().map(Arc::clone).collect()
    }

    /// Returns the ids of all registered clients in registration order.
    pub async fn ids(&self) -> Vec<ClientId> {
        self.clients.read().await.iter().map(|c| c.id()).collect()
    }

    /// Returns the number of registered clients.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns `true` if no client is registered.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// Sends `message` to one registered client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ClientNotFound`] if the id is not registered,
    /// or [`RegistryError::Send`] if the send itself fails.
    pub async fn send_to(
        &self,
        client_id: ClientId,
        message: &Map<String, Value>,
    ) -> Result<(), RegistryError> {
        let client = self
            .get(client_id)
            .await
            .ok_or(RegistryError::ClientNotFound(client_id))?;
        client.send_message(message).await?;
        Ok(())
    }

    /// Sends `message` to every registered client concurrently.
    ///
    /// Completes when the slowest send does. A client that has stopped
    /// reading holds the call up until its send timeout fires and it is
    /// reported in [`BroadcastReport::failed`]; without a send timeout it
    /// holds it up for as long as the peer stays stalled.
    pub async fn broadcast(&self, message: &Map<String, Value>) -> BroadcastReport {
        let targets = self.clients().await;
        let results = join_all(targets.iter().map(|client| async move {
            (client.id(), client.send_message(message).await)
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (client_id, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::debug!(%client_id, error = %err, "broadcast send failed");
                    report.failed.push((client_id, err));
                }
            }
        }
        report
    }

    /// Returns the lifecycle event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribes to future lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(EventBus::new(1024))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::outbound_client::testing::RecordingClient;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("payload must be an object");
        };
        map
    }

    #[tokio::test]
    async fn register_and_get() {
        let registry = ClientRegistry::default();
        let client = Arc::new(RecordingClient::new());
        let id = client.id();

        tokio_test::assert_ok!(registry.register(client).await);
        assert!(registry.get(id).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = ClientRegistry::default();
        let client = Arc::new(RecordingClient::new());
        let id = client.id();

        let first: Arc<dyn OutboundClient> = client;
        let second = Arc::clone(&first);
        tokio_test::assert_ok!(registry.register(first).await);

        let result = registry.register(second).await;
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(dup)) if dup == id));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn deregister_removes_and_publishes() {
        let registry = ClientRegistry::default();
        let mut rx = registry.subscribe();
        let client = Arc::new(RecordingClient::new());
        let id = client.id();

        let _ = registry.register(client).await;
        let removed = registry.deregister(id, DisconnectReason::RemoteClosed).await;
        assert!(removed.is_some());
        assert!(registry.is_empty().await);

        let Ok(connected) = rx.recv().await else {
            panic!("expected connect event");
        };
        assert_eq!(connected.event_type_str(), "client_connected");
        let Ok(GatewayEvent::ClientDisconnected {
            client_id, reason, ..
        }) = rx.recv().await
        else {
            panic!("expected disconnect event");
        };
        assert_eq!(client_id, id);
        assert_eq!(reason, DisconnectReason::RemoteClosed);
    }

    #[tokio::test]
    async fn deregister_unknown_is_noop() {
        let registry = ClientRegistry::default();
        let rx = registry.subscribe();
        let removed = registry
            .deregister(ClientId::new(), DisconnectReason::StreamEnded)
            .await;
        assert!(removed.is_none());
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn snapshot_preserves_registration_order() {
        let registry = ClientRegistry::default();
        let mut expected = Vec::new();
        for _ in 0..5 {
            let client = Arc::new(RecordingClient::new());
            expected.push(client.id());
            let _ = registry.register(client).await;
        }
        assert_eq!(registry.ids().await, expected);
        assert_eq!(registry.clients().await.len(), 5);
    }

    #[tokio::test]
    async fn send_to_reaches_only_target() {
        let registry = ClientRegistry::default();
        let target = Arc::new(RecordingClient::new());
        let other = Arc::new(RecordingClient::new());
        let _ = registry.register(Arc::clone(&target) as Arc<dyn OutboundClient>).await;
        let _ = registry.register(Arc::clone(&other) as Arc<dyn OutboundClient>).await;

        let msg = payload(json!({"status": "ok"}));
        tokio_test::assert_ok!(registry.send_to(target.id(), &msg).await);

        assert_eq!(target.sent().await, vec![msg]);
        assert!(other.sent().await.is_empty());
    }

    #[tokio::test]
    async fn send_to_unknown_client_fails() {
        let registry = ClientRegistry::default();
        let id = ClientId::new();
        let result = registry.send_to(id, &Map::new()).await;
        assert!(matches!(result, Err(RegistryError::ClientNotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn broadcast_reports_failures_per_client() {
        let registry = ClientRegistry::default();
        let healthy = Arc::new(RecordingClient::new());
        let broken = Arc::new(RecordingClient::broken());
        let broken_id = broken.id();
        let _ = registry.register(Arc::clone(&healthy) as Arc<dyn OutboundClient>).await;
        let _ = registry.register(broken).await;

        let msg = payload(json!({"post_type": "meta_event"}));
        let report = registry.broadcast(&msg).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed.first(),
            Some((id, SendError::Closed)) if *id == broken_id
        ));
        assert_eq!(healthy.sent().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_keeps_every_client() {
        let registry = Arc::new(ClientRegistry::default());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let client = Arc::new(RecordingClient::new());
                let id = client.id();
                registry.register(client).await.map(|()| id)
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            let Ok(Ok(id)) = handle.await else {
                panic!("registration task failed");
            };
            ids.push(id);
        }

        assert_eq!(registry.len().await, 32);
        for id in ids {
            assert!(registry.get(id).await.is_some());
        }
    }
}
