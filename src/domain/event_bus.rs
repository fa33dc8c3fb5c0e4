//! Fan-out of connection lifecycle events.
//!
//! The registry is the only publisher: one [`GatewayEvent::ClientConnected`]
//! per successful registration and one [`GatewayEvent::ClientDisconnected`]
//! per removal. Observers (metrics, audit, tests) subscribe independently and
//! never slow the registry down: publishing does not wait for them.

use tokio::sync::broadcast;

use super::GatewayEvent;

/// Lifecycle event channel shared by the registry and its observers.
///
/// An observer that falls more than `capacity` events behind loses the
/// oldest ones and sees [`broadcast::error::RecvError::Lagged`] on its next
/// receive.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GatewayEvent>,
}

impl EventBus {
    /// Buffers up to `capacity` undelivered events per observer (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Hands a lifecycle event to every current observer.
    ///
    /// Returns how many observers will see it; zero when nobody is watching.
    pub fn publish(&self, event: GatewayEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Starts observing. Events published before this call are not replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }

    /// Number of live observers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
