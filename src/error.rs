//! Gateway error types.
//!
//! [`AuthError`] is the only error surfaced over HTTP; it maps to a status
//! code and a small JSON error body.
//! [`SendError`] and [`RegistryError`] are returned to in-process callers of
//! the outbound path, and [`ConfigError`] is raised at startup.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ClientId;

/// JSON body of a rejected handshake.
///
/// ```json
/// { "error": "Incorrect token" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthErrorBody {
    /// Human-readable rejection message.
    pub error: String,
}

/// Reason a handshake was refused by the credential validator.
///
/// | Variant     | HTTP Status      | Body                          |
/// |-------------|------------------|-------------------------------|
/// | `Missing`   | 401 Unauthorized | `Missing or invalid token`    |
/// | `Malformed` | 401 Unauthorized | `Missing or invalid token`    |
/// | `Mismatch`  | 403 Forbidden    | `Incorrect token`             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("authorization header missing")]
    Missing,

    /// Header present but without the `Token ` scheme prefix.
    #[error("authorization header does not use the `Token` scheme")]
    Malformed,

    /// Well-formed header carrying the wrong token.
    #[error("authorization token mismatch")]
    Mismatch,
}

impl AuthError {
    /// Returns the HTTP status code for this rejection.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Missing | Self::Malformed => StatusCode::UNAUTHORIZED,
            Self::Mismatch => StatusCode::FORBIDDEN,
        }
    }

    /// Short machine-friendly reason used as a log field.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::Mismatch => "mismatch",
        }
    }

    /// Message placed in the response body.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Missing | Self::Malformed => "Missing or invalid token",
            Self::Mismatch => "Incorrect token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorBody {
            error: self.public_message().to_string(),
        };
        (self.status_code(), axum::Json(body)).into_response()
    }
}

/// Failure of a single outbound send. Never retried by the gateway.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The payload could not be represented as JSON.
    #[error("failed to serialize outbound message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client's connection handle is already closed.
    #[error("connection is closed")]
    Closed,

    /// Writing the frame to the transport failed.
    #[error("failed to write frame: {0}")]
    Transport(String),

    /// Writing the frame did not complete within the configured limit.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors raised by [`crate::domain::ClientRegistry`] operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A client with the same id is already registered.
    #[error("client {0} is already registered")]
    AlreadyRegistered(ClientId),

    /// No registered client has the given id.
    #[error("client {0} is not registered")]
    ClientNotFound(ClientId),

    /// The target client was found but the send failed.
    #[error(transparent)]
    Send(#[from] SendError),
}

/// Errors raised while loading [`crate::config::GatewayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Raw value found in the environment.
        value: String,
    },

    /// `WS_SERVER_TOKEN` is unset or empty.
    #[error("WS_SERVER_TOKEN must be set to a non-empty value")]
    MissingToken,

    /// `WS_PATH` does not start with `/`.
    #[error("WS_PATH must start with '/', got {0:?}")]
    InvalidWsPath(String),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_malformed_map_to_401() {
        assert_eq!(AuthError::Missing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Malformed.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Missing.public_message(),
            AuthError::Malformed.public_message()
        );
    }

    #[test]
    fn mismatch_maps_to_403() {
        assert_eq!(AuthError::Mismatch.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Mismatch.public_message(), "Incorrect token");
    }

    #[test]
    fn response_carries_status() {
        let response = AuthError::Mismatch.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn registry_error_wraps_send_error() {
        let err = RegistryError::from(SendError::Closed);
        assert_eq!(err.to_string(), "connection is closed");
    }
}
