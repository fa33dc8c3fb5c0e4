//! Opaque remote platform API handles.
//!
//! The gateway stores two handles per client and passes them through to the
//! dispatcher untouched. Dispatchers recover their concrete client type with
//! [`RemoteApi::as_any`] / `downcast_ref`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A handle to the remote platform API, opaque to the gateway.
pub trait RemoteApi: Send + Sync + fmt::Debug + 'static {
    /// Exposes the concrete type for downcasting by dispatchers.
    fn as_any(&self) -> &dyn Any;
}

impl dyn RemoteApi {
    /// Returns the handle as `T` if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<T: RemoteApi>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// The primary and secondary API handles bound to every client.
#[derive(Debug, Clone)]
pub struct ApiHandles {
    primary: Arc<dyn RemoteApi>,
    secondary: Arc<dyn RemoteApi>,
}

impl ApiHandles {
    /// Pairs the two handles.
    #[must_use]
    pub fn new(primary: Arc<dyn RemoteApi>, secondary: Arc<dyn RemoteApi>) -> Self {
        Self { primary, secondary }
    }

    /// Primary API handle.
    #[must_use]
    pub fn primary(&self) -> &Arc<dyn RemoteApi> {
        &self.primary
    }

    /// Secondary API handle.
    #[must_use]
    pub fn secondary(&self) -> &Arc<dyn RemoteApi> {
        &self.secondary
    }
}

/// Placeholder handle used when no platform client is wired in.
#[derive(Debug, Clone)]
pub struct UnconfiguredApi {
    label: &'static str,
}

impl UnconfiguredApi {
    /// Creates a placeholder named `label` (shown in logs).
    #[must_use]
    pub const fn new(label: &'static str) -> Self {
        Self { label }
    }

    /// Name given at construction.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }
}

impl RemoteApi for UnconfiguredApi {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
