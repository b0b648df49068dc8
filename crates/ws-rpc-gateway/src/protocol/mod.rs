//! JSON-RPC 2.0 wire protocol.

pub mod codec;
pub mod message;

pub use codec::{parse, JsonRpcRequest, ParsedMessage, ParsedUnit};
pub use message::{batch_to_text, JsonRpcId, JsonRpcNotification, JsonRpcResponse};
