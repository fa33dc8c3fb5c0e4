//! HTTP endpoint handlers outside the gateway socket itself.

pub mod system;
