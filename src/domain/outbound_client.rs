//! Transport-agnostic send capability.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::ClientId;
use crate::error::SendError;

/// Anything the gateway can push messages to.
///
/// Implemented by [`crate::ws::GatewayClient`] for WebSocket sessions. The
/// registry stores clients behind this trait so other transports can share
/// the same membership and dispatch paths.
#[async_trait]
pub trait OutboundClient: Send + Sync + fmt::Debug {
    /// Stable identity used for registry membership.
    fn id(&self) -> ClientId;

    /// Serializes `message` as JSON and writes it as a single text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] on serialization or transport failure.
    async fn send_message(&self, message: &Map<String, Value>) -> Result<(), SendError>;
}
