//! WebSocket layer: handshake handler, connection loop, client handle.
//!
//! The gateway endpoint (default `/ws`) authenticates the `Authorization: Token <value>` header,
//! upgrades, registers a [`GatewayClient`] and relays every decoded
//! [`crate::domain::ActionMessage`] to the dispatcher.

pub mod client;
pub mod connection;
pub mod handler;

pub use client::{GatewayClient, PeerInfo};
