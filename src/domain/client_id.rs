//! Type-safe connection identifier.
//!
//! [`ClientId`] wraps a [`uuid::Uuid`] (v4) so that connection identities
//! cannot be confused with other UUIDs flowing through a host process.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of one gateway connection.
///
/// Generated when the WebSocket upgrade completes and immutable for the
/// lifetime of the connection. Used as the membership key in
/// [`super::ClientRegistry`] and carried by every [`super::GatewayEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    /// Creates a new random `ClientId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `ClientId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for ClientId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ClientId::new(), ClientId::new());
    }

    #[test]
    fn display_matches_inner_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let id = ClientId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = ClientId::new();
        let Ok(json) = serde_json::to_value(id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
