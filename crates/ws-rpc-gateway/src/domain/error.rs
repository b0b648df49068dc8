//! Gateway error types with JSON-RPC 2.0 error codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const LIMIT_EXCEEDED: i32 = -32005;
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// JSON-RPC error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Optional additional data
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error - invalid JSON or a non-text frame
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::with_data(codes::PARSE_ERROR, "Parse error", details.into().into())
    }

    /// Invalid request - not a conforming JSON-RPC object
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::with_data(
            codes::INVALID_REQUEST,
            "Invalid request",
            details.into().into(),
        )
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::with_data(codes::METHOD_NOT_FOUND, "Method not found", method.into())
    }

    /// Invalid parameters
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::with_data(codes::INVALID_PARAMS, "Invalid params", details.into().into())
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::with_data(codes::INTERNAL_ERROR, "Internal error", details.into().into())
    }

    /// Limit exceeded (message size, rate)
    pub fn limit_exceeded(limit: impl Into<String>) -> Self {
        Self::new(
            codes::LIMIT_EXCEEDED,
            format!("Limit exceeded: {}", limit.into()),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let len = if self.data.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("ApiError", len)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ErrorHelper {
            code: i32,
            message: String,
            data: Option<serde_json::Value>,
        }

        let helper = ErrorHelper::deserialize(deserializer)?;
        Ok(ApiError {
            code: helper.code,
            message: helper.message,
            data: helper.data,
        })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            ApiError::parse_error(e.to_string())
        } else {
            ApiError::invalid_params(e.to_string())
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Service-level errors (not JSON-RPC)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::domain::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(#[source] std::io::Error),

    /// The service was already started
    #[error("gateway already running")]
    AlreadyRunning,

    /// HTTP server terminated with an error
    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}
