//! onebot-gateway server entry point.
//!
//! Starts the Axum HTTP server with the gateway WebSocket endpoint and the
//! system routes.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use onebot_gateway::app_state::AppState;
use onebot_gateway::auth::TokenValidator;
use onebot_gateway::config::{GatewayConfig, LogFormat};
use onebot_gateway::domain::{ClientRegistry, EventBus};
use onebot_gateway::server::{build_app, serve, shutdown_signal};
use onebot_gateway::service::{ApiHandles, UnconfiguredApi, UnsupportedActionDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, ws_path = %config.ws_path, "starting onebot-gateway");

    // Build domain layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let registry = Arc::new(ClientRegistry::new(event_bus));

    // No platform integration is linked into the standalone binary.
    let apis = ApiHandles::new(
        Arc::new(UnconfiguredApi::new("primary")),
        Arc::new(UnconfiguredApi::new("secondary")),
    );

    let state = AppState::new(
        TokenValidator::new(config.ws_server_token.clone()),
        registry,
        Arc::new(UnsupportedActionDispatcher),
        apis,
        config.connection_settings(),
    );

    let app = build_app(state, &config.ws_path);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    serve(listener, app, shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}
