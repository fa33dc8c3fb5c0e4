//! Inbound action envelope.
//!
//! An [`ActionMessage`] is the decoded form of one text frame received from a
//! gateway client. The gateway never interprets `params`; it only needs the
//! envelope to be valid structured data before handing it to the
//! [`crate::service::ActionDispatcher`].

use serde::{Deserialize, Serialize};

/// Decoded envelope of one inbound frame.
///
/// Wire shape: `{"action": "...", "params": {...}, "echo": ...}`. All fields
/// are optional on the wire, so any JSON object decodes; non-object JSON and
/// non-JSON text do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMessage {
    /// Name of the action to invoke (e.g. `"send_msg"`).
    #[serde(default)]
    pub action: String,
    /// Action parameters, forwarded untouched.
    #[serde(default)]
    pub params: serde_json::Value,
    /// Opaque correlation value echoed back in responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<serde_json::Value>,
}

impl ActionMessage {
    /// Decodes one text frame into an `ActionMessage`.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the frame is not a
    /// JSON object matching the envelope shape.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Renders the message as compact JSON cut to at most `limit` characters,
    /// with a trailing `...` when truncated. Used for log lines only.
    #[must_use]
    pub fn summary(&self, limit: usize) -> String {
        let rendered = serde_json::to_string(self).unwrap_or_else(|_| self.action.clone());
        truncate_chars(&rendered, limit)
    }
}

/// Cuts `text` to at most `limit` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => {
            let mut out = text.get(..cut).unwrap_or_default().to_string();
            out.push_str("...");
            out
        }
        None => text.to_string(),
    }
}
