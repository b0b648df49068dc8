//! Outbound JSON-RPC 2.0 objects and their wire form.

use crate::domain::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version marker carried by every object.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request ID type
///
/// A string or a number. Null ids are represented as `Option::None` by the
/// callers, since they mark notifications or unknown ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String ID
    String(String),
    /// Numeric ID, kept as written (integers and floats alike)
    Number(serde_json::Number),
}

impl JsonRpcId {
    /// Read an id from a raw JSON value. Only strings and numbers qualify.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            _ => None,
        }
    }
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "\"{}\"", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Outcome carried by a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    /// Success value
    Result(serde_json::Value),
    /// Error object
    Error(ApiError),
}

/// A success or error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    /// Echoed request id; serialized as `null` when unknown
    pub id: Option<JsonRpcId>,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl JsonRpcResponse {
    /// Build a success response.
    pub fn success(id: Option<JsonRpcId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    /// Build an error response.
    pub fn error(id: Option<JsonRpcId>, error: ApiError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: ResponsePayload::Error(error),
        }
    }

    /// Whether this is an error response.
    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error(_))
    }

    /// Serialize to wire text.
    ///
    /// Falls back to an internal error with the same id if the result value
    /// cannot be encoded.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| internal_error_text(&self.id, &e))
    }
}

/// A server-to-client push. Never carries an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcNotification<P> {
    jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
}

impl<P: Serialize> JsonRpcNotification<P> {
    /// Build a notification.
    pub fn new(method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }

    /// Serialize to wire text.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Serialize a batch reply as a JSON array, preserving order.
pub fn batch_to_text(responses: &[JsonRpcResponse]) -> String {
    serde_json::to_string(responses).unwrap_or_else(|e| internal_error_text(&None, &e))
}

fn internal_error_text(id: &Option<JsonRpcId>, err: &serde_json::Error) -> String {
    serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": ApiError::internal(err.to_string()),
    })
    .to_string()
}
