//! Handshake credential validation.
//!
//! Clients authenticate with `Authorization: Token <value>`. The presented
//! value is compared in constant time against the configured server token.

use std::fmt;

use axum::http::HeaderValue;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// Scheme prefix required on the `Authorization` header.
pub const TOKEN_SCHEME: &str = "Token ";

/// Validates handshake credentials against a single configured token.
#[derive(Clone)]
pub struct TokenValidator {
    expected: String,
}

impl TokenValidator {
    /// Creates a validator accepting exactly `expected`.
    #[must_use]
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Validates a raw `Authorization` header value.
    ///
    /// Values that are not visible ASCII are treated as malformed.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] describing why the credential was refused.
    pub fn validate(&self, header: Option<&HeaderValue>) -> Result<(), AuthError> {
        match header {
            None => Err(AuthError::Missing),
            Some(value) => {
                let text = value.to_str().map_err(|_| AuthError::Malformed)?;
                self.validate_str(Some(text))
            }
        }
    }

    /// Validates an already-decoded `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Missing`] for an absent or empty header,
    /// [`AuthError::Malformed`] when the `Token ` prefix is missing and
    /// [`AuthError::Mismatch`] when the token differs.
    pub fn validate_str(&self, header: Option<&str>) -> Result<(), AuthError> {
        let presented = extract_token(header)?;
        if bool::from(presented.as_bytes().ct_eq(self.expected.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::Mismatch)
        }
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("expected", &"<redacted>")
            .finish()
    }
}

/// Strips the `Token ` scheme from a header value.
fn extract_token(header: Option<&str>) -> Result<&str, AuthError> {
    match header {
        None | Some("") => Err(AuthError::Missing),
        Some(value) => value.strip_prefix(TOKEN_SCHEME).ok_or(AuthError::Malformed),
    }
}
