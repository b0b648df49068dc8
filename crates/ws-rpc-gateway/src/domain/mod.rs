//! Domain types for the gateway.
//!
//! Configuration, errors, topics and notification payloads. Nothing in here
//! touches the transport.

pub mod client_id;
pub mod config;
pub mod error;
pub mod notification;
pub mod topic;

// Re-exports for convenience
pub use client_id::ClientId;
pub use config::{BatchConfig, ConfigError, GatewayConfig, WebSocketConfig};
pub use error::{ApiError, ApiResult, GatewayError};
pub use notification::{
    AddressBalanceNotification, AddressTxUpdateNotification, TxRecord, TxStatus,
    TxUpdateNotification,
};
pub use topic::{normalize_hash_string, SubscriptionRequest, Topic, TopicKind};
