//! # onebot-gateway
//!
//! Token-authenticated WebSocket gateway that relays OneBot-style action
//! messages to a remote platform API and pushes messages back to connected
//! clients.
//!
//! The gateway authenticates each handshake, upgrades it, registers the
//! resulting client, and runs one read loop per connection. Interpreting
//! actions is delegated to an [`service::ActionDispatcher`]; any component
//! holding the [`domain::ClientRegistry`] can push messages back.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, `Authorization: Token <value>`)
//!     │
//!     ├── Handshake handler (ws/handler)   ── TokenValidator (auth)
//!     ├── Connection loop (ws/connection)  ── GatewayClient (ws/client)
//!     │
//!     ├── ClientRegistry + EventBus (domain/)
//!     │
//!     └── ActionDispatcher ── RemoteApi handles (service/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
