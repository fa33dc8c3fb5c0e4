//! Domain layer: connection identity, the inbound envelope, the client
//! registry and its lifecycle events.
//!
//! Nothing in here knows about WebSockets; the registry only sees clients
//! through the [`OutboundClient`] capability.

pub mod action_message;
pub mod client_id;
pub mod client_registry;
pub mod event_bus;
pub mod gateway_event;
pub mod outbound_client;

pub use action_message::ActionMessage;
pub use client_id::ClientId;
pub use client_registry::{BroadcastReport, ClientRegistry};
pub use event_bus::EventBus;
pub use gateway_event::{DisconnectReason, GatewayEvent};
pub use outbound_client::OutboundClient;
