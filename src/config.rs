//! Gateway configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Parsing goes through a lookup function so it can be exercised
//! without touching the process environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Path of the WebSocket endpoint (e.g. `/ws`).
    pub ws_path: String,

    /// Token clients must present as `Authorization: Token <value>`.
    pub ws_server_token: String,

    /// Seconds without an inbound frame before a connection is dropped
    /// (0 = never).
    pub idle_timeout_secs: u64,

    /// Seconds a single outbound frame may take to write (0 = unbounded).
    pub send_timeout_secs: u64,

    /// Capacity of the lifecycle event broadcast channel.
    pub event_bus_capacity: usize,

    /// Characters of an inbound message reproduced in log lines.
    pub log_message_truncate: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("ws_path", &self.ws_path)
            .field("ws_server_token", &"<redacted>")
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("send_timeout_secs", &self.send_timeout_secs)
            .field("event_bus_capacity", &self.event_bus_capacity)
            .field("log_message_truncate", &self.log_message_truncate)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Per-connection runtime settings derived from [`GatewayConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Drop the connection after this long without an inbound frame.
    pub idle_timeout: Option<Duration>,
    /// Fail a send that takes longer than this.
    pub send_timeout: Option<Duration>,
    /// Characters of an inbound message reproduced in log lines.
    pub log_message_truncate: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            send_timeout: None,
            log_message_truncate: 500,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `WS_SERVER_TOKEN` is missing, or if any
    /// variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen_addr = parse_var(&lookup, "LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let ws_path = lookup("WS_PATH").unwrap_or_else(|| "/ws".to_string());
        if !ws_path.starts_with('/') {
            return Err(ConfigError::InvalidWsPath(ws_path));
        }

        let ws_server_token = lookup("WS_SERVER_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let idle_timeout_secs = parse_var(&lookup, "WS_IDLE_TIMEOUT_SECS", 0)?;
        let send_timeout_secs = parse_var(&lookup, "WS_SEND_TIMEOUT_SECS", 0)?;
        let event_bus_capacity = parse_var(&lookup, "EVENT_BUS_CAPACITY", 1024)?;
        let log_message_truncate = parse_var(&lookup, "LOG_MESSAGE_TRUNCATE", 500)?;
        let log_format = parse_var(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            listen_addr,
            ws_path,
            ws_server_token,
            idle_timeout_secs,
            send_timeout_secs,
            event_bus_capacity,
            log_message_truncate,
            log_format,
        })
    }

    /// Returns the per-connection settings.
    #[must_use]
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            idle_timeout: non_zero_secs(self.idle_timeout_secs),
            send_timeout: non_zero_secs(self.send_timeout_secs),
            log_message_truncate: self.log_message_truncate,
        }
    }
}

/// Parses `key` as `T`, returning `default` when unset and an error when set
/// to an unparsable value.
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then_some(Duration::from_secs(secs))
}
