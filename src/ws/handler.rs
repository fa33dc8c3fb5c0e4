//! Gateway endpoint: authenticate, then upgrade.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Response};

use super::client::PeerInfo;
use super::connection::run_connection;
use crate::app_state::AppState;
use crate::error::AuthErrorBody;

/// `GET /ws` — Authenticate and upgrade to a WebSocket.
///
/// Credentials are checked before the upgrade headers are looked at, so an
/// unauthenticated request is refused with 401/403 whether or not it asked
/// for an upgrade. Any `Origin` is accepted.
#[utoipa::path(
    get,
    path = "/ws",
    tag = "Gateway",
    summary = "Open a gateway connection",
    description = "Upgrades to a WebSocket carrying JSON action messages. Requires `Authorization: Token <value>`.",
    params(
        ("Authorization" = String, Header, description = "`Token <value>`"),
    ),
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 401, description = "Missing or invalid token", body = AuthErrorBody),
        (status = 403, description = "Incorrect token", body = AuthErrorBody),
    )
)]
pub async fn ws_handler(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let client_ip = client_ip(&headers, peer_addr);

    if let Err(err) = state.validator.validate(headers.get(AUTHORIZATION)) {
        tracing::warn!(%client_ip, reason = err.reason(), "websocket handshake rejected");
        return err.into_response();
    }

    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(%client_ip, error = %rejection, "websocket upgrade negotiation failed");
            return rejection.into_response();
        }
    };

    let peer = PeerInfo {
        peer_addr,
        client_ip,
    };
    ws.on_failed_upgrade(move |err| {
        tracing::warn!(%client_ip, error = %err, "websocket upgrade failed");
    })
    .on_upgrade(move |socket| run_connection(socket, state, peer))
}

/// Resolves the client IP: first `X-Forwarded-For` entry, then
/// `X-Real-IP`, else the TCP peer.
fn client_ip(headers: &HeaderMap, peer_addr: SocketAddr) -> IpAddr {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    };
    forwarded.or_else(real_ip).unwrap_or_else(|| peer_addr.ip())
}
