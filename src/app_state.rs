//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::config::ConnectionSettings;
use crate::domain::ClientRegistry;
use crate::service::{ActionDispatcher, ApiHandles};

/// Everything a gateway request needs, bound once at startup and available
/// to handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handshake credential validator.
    pub validator: Arc<TokenValidator>,
    /// Process-wide registry of connected clients.
    pub registry: Arc<ClientRegistry>,
    /// Consumer of decoded inbound messages.
    pub dispatcher: Arc<dyn ActionDispatcher>,
    /// Remote API handles bound to every new client.
    pub apis: ApiHandles,
    /// Per-connection runtime settings.
    pub settings: ConnectionSettings,
}

impl AppState {
    /// Binds the gateway's collaborators.
    #[must_use]
    pub fn new(
        validator: TokenValidator,
        registry: Arc<ClientRegistry>,
        dispatcher: Arc<dyn ActionDispatcher>,
        apis: ApiHandles,
        settings: ConnectionSettings,
    ) -> Self {
        Self {
            validator: Arc::new(validator),
            registry,
            dispatcher,
            apis,
            settings,
        }
    }
}
