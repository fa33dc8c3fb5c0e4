//! Per-connection lifecycle: register, read loop, deregister.
//!
//! The read loop is the only reader of its socket. Text frames are decoded
//! and dispatched inline, so messages from one client are handled strictly
//! in arrival order. A frame that fails to decode is logged and dropped;
//! only transport failures end the connection.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use tokio::time::error::Elapsed;

use super::client::{GatewayClient, PeerInfo};
use crate::app_state::AppState;
use crate::domain::{ActionMessage, DisconnectReason, OutboundClient};

type FrameResult = Result<Option<Result<Message, axum::Error>>, Elapsed>;

/// Runs one upgraded connection to completion.
///
/// The client is registered before the first frame is read and removed
/// from the registry before its handle is closed.
pub async fn run_connection(socket: WebSocket, state: AppState, peer: PeerInfo) {
    let (ws_tx, mut ws_rx) = socket.split();
    let client = Arc::new(GatewayClient::new(
        ws_tx,
        peer,
        state.apis.clone(),
        state.settings.send_timeout,
    ));
    let client_id = client.id();

    if let Err(err) = state
        .registry
        .register(Arc::clone(&client) as Arc<dyn OutboundClient>)
        .await
    {
        tracing::error!(%client_id, error = %err, "failed to register websocket client");
        client.close().await;
        return;
    }
    tracing::info!(
        %client_id,
        client_ip = %peer.client_ip,
        peer_addr = %peer.peer_addr,
        "websocket client connected"
    );

    let reason = read_loop(&mut ws_rx, &client, &state).await;

    state.registry.deregister(client_id, reason.clone()).await;
    client.close().await;
    tracing::info!(%client_id, client_ip = %peer.client_ip, %reason, "websocket client disconnected");
}

async fn read_loop(
    ws_rx: &mut SplitStream<WebSocket>,
    client: &Arc<GatewayClient>,
    state: &AppState,
) -> DisconnectReason {
    let mut closed = client.closed_signal();

    loop {
        let frame = tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => return DisconnectReason::WriteFailed,
            frame = next_frame(ws_rx, state.settings.idle_timeout) => frame,
        };

        match frame {
            Ok(Some(Ok(Message::Text(text)))) => {
                handle_text_frame(text.as_str(), client, state).await;
            }
            Ok(Some(Ok(Message::Close(_)))) => return DisconnectReason::RemoteClosed,
            // Binary, ping and pong frames carry no actions.
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(err))) => {
                tracing::warn!(client_id = %client.id(), error = %err, "error reading websocket frame");
                return DisconnectReason::ReadError {
                    message: err.to_string(),
                };
            }
            Ok(None) => return DisconnectReason::StreamEnded,
            Err(_) => return DisconnectReason::IdleTimeout,
        }
    }
}

async fn next_frame(ws_rx: &mut SplitStream<WebSocket>, idle: Option<Duration>) -> FrameResult {
    match idle {
        Some(limit) => tokio::time::timeout(limit, ws_rx.next()).await,
        None => Ok(ws_rx.next().await),
    }
}

async fn handle_text_frame(text: &str, client: &Arc<GatewayClient>, state: &AppState) {
    let message = match ActionMessage::decode(text) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(
                client_id = %client.id(),
                error = %err,
                raw = text,
                "discarding undecodable message"
            );
            return;
        }
    };

    tracing::info!(
        client_id = %client.id(),
        action = %message.action,
        message = %message.summary(state.settings.log_message_truncate),
        "received action message"
    );

    let apis = client.apis();
    state
        .dispatcher
        .dispatch(
            Arc::clone(client) as Arc<dyn OutboundClient>,
            Arc::clone(apis.primary()),
            Arc::clone(apis.secondary()),
            message,
        )
        .await;
}
