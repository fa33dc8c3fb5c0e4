//! Service seams consumed by the gateway.
//!
//! [`ActionDispatcher`] receives decoded messages; [`RemoteApi`] handles are
//! stored per client and passed through to it unmodified.

pub mod dispatcher;
pub mod remote_api;

pub use dispatcher::{ActionDispatcher, UnsupportedActionDispatcher};
pub use remote_api::{ApiHandles, RemoteApi, UnconfiguredApi};
