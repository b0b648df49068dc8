//! Inbound message classification.
//!
//! A text frame becomes either one unit or an ordered batch of units. Each
//! unit is classified independently, so one bad element never poisons the
//! rest of a batch.

use super::message::{JsonRpcId, JSONRPC_VERSION};
use crate::domain::error::ApiError;
use serde_json::{Map, Value};

/// A request that expects a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    pub id: JsonRpcId,
    pub method: String,
    pub params: Option<Value>,
}

/// One classified element of an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedUnit {
    /// Method call with an id
    Request(JsonRpcRequest),
    /// Method call without an id; never answered
    Notification { method: String, params: Option<Value> },
    /// A success response sent by the client
    Success { id: Option<JsonRpcId>, result: Value },
    /// An error response sent by the client
    Error { id: Option<JsonRpcId>, error: Value },
    /// Anything else; carries the invalid-request error to send back
    Invalid(ApiError),
}

/// Result of parsing one text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    /// A lone object (or an empty array, which is one invalid unit)
    Single(ParsedUnit),
    /// A non-empty array
    Batch(Vec<ParsedUnit>),
}

/// Parse a text frame.
///
/// Malformed JSON is the only top-level failure and maps to a parse error.
pub fn parse(text: &str) -> Result<ParsedMessage, ApiError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ApiError::parse_error(e.to_string()))?;

    Ok(match value {
        Value::Array(items) if items.is_empty() => {
            ParsedMessage::Single(ParsedUnit::Invalid(ApiError::invalid_request("empty batch")))
        }
        Value::Array(items) => ParsedMessage::Batch(items.into_iter().map(classify).collect()),
        other => ParsedMessage::Single(classify(other)),
    })
}

/// Classify one JSON value.
pub fn classify(value: Value) -> ParsedUnit {
    let Value::Object(mut obj) = value else {
        return invalid("message must be an object");
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return invalid("jsonrpc must be \"2.0\"");
    }

    if obj.contains_key("method") {
        return classify_call(obj);
    }

    let id = match read_id(&obj) {
        Ok(id) => id,
        Err(unit) => return unit,
    };

    if let Some(result) = obj.remove("result") {
        return ParsedUnit::Success { id, result };
    }
    if let Some(error) = obj.remove("error") {
        return ParsedUnit::Error { id, error };
    }

    invalid("message must carry a method, result or error")
}

fn classify_call(mut obj: Map<String, Value>) -> ParsedUnit {
    let method = match obj.remove("method") {
        Some(Value::String(m)) if !m.is_empty() => m,
        _ => return invalid("method must be a non-empty string"),
    };
    let params = obj.remove("params");

    match read_id(&obj) {
        Ok(Some(id)) => ParsedUnit::Request(JsonRpcRequest { id, method, params }),
        Ok(None) => ParsedUnit::Notification { method, params },
        Err(unit) => unit,
    }
}

/// Absent and null ids are `None`; other non-string, non-number ids are invalid.
fn read_id(obj: &Map<String, Value>) -> Result<Option<JsonRpcId>, ParsedUnit> {
    match obj.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => JsonRpcId::from_value(raw)
            .map(Some)
            .ok_or_else(|| invalid("id must be a string or number")),
    }
}

fn invalid(reason: &str) -> ParsedUnit {
    ParsedUnit::Invalid(ApiError::invalid_request(reason))
}
