//! Connection lifecycle events.
//!
//! The [`super::ClientRegistry`] publishes a [`GatewayEvent`] through the
//! [`super::EventBus`] whenever membership changes, so schedulers and other
//! bridges can react without polling the registry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ClientId;

/// Why a connection's read loop stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisconnectReason {
    /// The client sent a close frame.
    RemoteClosed,
    /// The frame stream ended without a close frame.
    StreamEnded,
    /// Reading the next frame failed.
    ReadError {
        /// Transport error description.
        message: String,
    },
    /// A write to the client failed, tearing the connection down.
    WriteFailed,
    /// No frame arrived within the configured idle timeout.
    IdleTimeout,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteClosed => f.write_str("remote closed"),
            Self::StreamEnded => f.write_str("stream ended"),
            Self::ReadError { message } => write!(f, "read error: {message}"),
            Self::WriteFailed => f.write_str("write failed"),
            Self::IdleTimeout => f.write_str("idle timeout"),
        }
    }
}

/// Registry membership change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// A client finished its upgrade and was registered.
    ClientConnected {
        /// Connection identifier.
        client_id: ClientId,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A client was removed from the registry.
    ClientDisconnected {
        /// Connection identifier.
        client_id: ClientId,
        /// Why the connection ended.
        reason: DisconnectReason,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl GatewayEvent {
    /// Returns the client this event refers to.
    #[must_use]
    pub const fn client_id(&self) -> ClientId {
        match self {
            Self::ClientConnected { client_id, .. } | Self::ClientDisconnected { client_id, .. } => {
                *client_id
            }
        }
    }

    /// Returns the snake_case event type string used on the wire.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ClientConnected { .. } => "client_connected",
            Self::ClientDisconnected { .. } => "client_disconnected",
        }
    }
}
