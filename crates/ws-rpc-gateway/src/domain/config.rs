//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default WebSocket endpoint path
pub const DEFAULT_WS_PATH: &str = "/extended/v1/ws";

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// WebSocket server configuration
    pub websocket: WebSocketConfig,
    /// Batch reply policy
    pub batch: BatchConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.websocket.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.websocket.path.clone()));
        }

        if matches!(
            self.websocket.path.as_str(),
            "/health" | "/metrics" | "/metrics/prometheus"
        ) {
            return Err(ConfigError::InvalidPath(format!(
                "{} collides with an HTTP endpoint",
                self.websocket.path
            )));
        }

        if self.websocket.max_message_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_message_size cannot be 0".into(),
            ));
        }

        if self.websocket.rate_limit == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "rate_limit cannot be 0".into(),
            ));
        }

        if self.websocket.send_queue_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "send_queue_size cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get server bind address
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.websocket.host, self.websocket.port)
    }

    /// Load defaults overlaid with `GW_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load defaults overlaid with values from an arbitrary key lookup.
    ///
    /// A variable that is present but does not parse is an error rather than
    /// a silent fallback.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let ws = &mut config.websocket;

        if let Some(host) = lookup("GW_HOST") {
            ws.host = parse_var("GW_HOST", &host)?;
        }
        if let Some(port) = lookup("GW_PORT") {
            ws.port = parse_var("GW_PORT", &port)?;
        }
        if let Some(path) = lookup("GW_WS_PATH") {
            ws.path = path;
        }
        if let Some(size) = lookup("GW_MAX_MESSAGE_SIZE") {
            ws.max_message_size = parse_var("GW_MAX_MESSAGE_SIZE", &size)?;
        }
        if let Some(rate) = lookup("GW_RATE_LIMIT") {
            ws.rate_limit = parse_var("GW_RATE_LIMIT", &rate)?;
        }
        if let Some(queue) = lookup("GW_SEND_QUEUE_SIZE") {
            ws.send_queue_size = parse_var("GW_SEND_QUEUE_SIZE", &queue)?;
        }
        if let Some(flag) = lookup("GW_REPLY_TO_EMPTY_BATCH") {
            config.batch.reply_to_empty_batch = parse_bool("GW_REPLY_TO_EMPTY_BATCH", &flag)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}={value}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid(format!("{key}={value}"))),
    }
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3999, 0 picks a free port)
    pub port: u16,
    /// Endpoint path for the WebSocket upgrade
    pub path: String,
    /// Max inbound message size in bytes
    pub max_message_size: usize,
    /// Max inbound messages per second per connection
    pub rate_limit: u32,
    /// Outbound queue depth per connection
    pub send_queue_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3999,
            path: DEFAULT_WS_PATH.to_string(),
            max_message_size: 1024 * 1024, // 1MB
            rate_limit: 100,
            send_queue_size: 256,
        }
    }
}

/// Batch reply policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Send `[]` for a batch whose units were all client notifications.
    /// When false, such a batch gets no reply at all.
    pub reply_to_empty_batch: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            reply_to_empty_batch: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid endpoint path
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// A value failed to parse
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
