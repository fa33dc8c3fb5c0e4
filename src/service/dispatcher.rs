//! Action dispatch seam.
//!
//! The gateway hands every decoded [`ActionMessage`] to an
//! [`ActionDispatcher`]. Interpreting the action and calling the remote
//! platform is the dispatcher's job; the gateway only guarantees per-client
//! arrival order.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::RemoteApi;
use crate::domain::{ActionMessage, OutboundClient};

/// OneBot return code for an action the implementation does not support.
pub const RETCODE_UNSUPPORTED_ACTION: i64 = 1404;

/// Consumer of decoded inbound messages.
#[async_trait]
pub trait ActionDispatcher: Send + Sync + fmt::Debug {
    /// Handles one message received from `client`.
    ///
    /// Called once per decoded frame, in arrival order for a given client.
    /// Failures are the dispatcher's concern; replies go back through
    /// `client`.
    async fn dispatch(
        &self,
        client: Arc<dyn OutboundClient>,
        primary: Arc<dyn RemoteApi>,
        secondary: Arc<dyn RemoteApi>,
        message: ActionMessage,
    );
}

/// Dispatcher that answers every action with an "unsupported" failure.
///
/// Wired by the standalone binary so clients get a well-formed reply when no
/// platform integration is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedActionDispatcher;

impl UnsupportedActionDispatcher {
    fn reply_for(message: &ActionMessage) -> Map<String, Value> {
        let mut reply = Map::new();
        reply.insert("status".to_string(), json!("failed"));
        reply.insert("retcode".to_string(), json!(RETCODE_UNSUPPORTED_ACTION));
        reply.insert("data".to_string(), Value::Null);
        reply.insert(
            "message".to_string(),
            json!(format!("unsupported action: {}", message.action)),
        );
        if let Some(echo) = &message.echo {
            reply.insert("echo".to_string(), echo.clone());
        }
        reply
    }
}

#[async_trait]
impl ActionDispatcher for UnsupportedActionDispatcher {
    async fn dispatch(
        &self,
        client: Arc<dyn OutboundClient>,
        _primary: Arc<dyn RemoteApi>,
        _secondary: Arc<dyn RemoteApi>,
        message: ActionMessage,
    ) {
        tracing::debug!(client_id = %client.id(), action = %message.action, "no handler for action");
        if let Err(err) = client.send_message(&Self::reply_for(&message)).await {
            tracing::warn!(client_id = %client.id(), error = %err, "failed to send unsupported-action reply");
        }
    }
}
