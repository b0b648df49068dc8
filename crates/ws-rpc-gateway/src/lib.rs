//! Real-time transaction notification gateway.
//!
//! Clients open a WebSocket, subscribe to topics over JSON-RPC 2.0 and get
//! pushes when the data store reports a matching change.
//!
//! # Architecture
//!
//! ```text
//!  client ──ws──► WebSocketHandler ──► codec ──► RequestRouter ──► SubscriptionRegistry
//!                        ▲                                                 │
//!                        │ push                                            │ subscribers
//!                        └──────────── NotificationFanout ◄────────────────┘
//!                                          ▲          │
//!                                   EventFeed      TxStore
//! ```
//!
//! # Topics
//!
//! - `tx_update` keyed by normalized transaction id
//! - `address_tx_update` keyed by address
//! - `address_balance_update` keyed by address
//!
//! # Usage
//!
//! ```ignore
//! use ws_rpc_gateway::{GatewayConfig, GatewayService};
//!
//! let mut service = GatewayService::new(GatewayConfig::from_env()?, store, feed)?;
//! let addr = service.start().await?;
//! // ...
//! service.shutdown().await?;
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod protocol;
pub mod service;
pub mod ws;

// Re-exports for public API
pub use adapters::InMemoryTxStore;
pub use domain::config::{BatchConfig, ConfigError, GatewayConfig, WebSocketConfig};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::notification::{TxRecord, TxStatus};
pub use domain::topic::{normalize_hash_string, Topic, TopicKind};
pub use middleware::GatewayMetrics;
pub use ports::{StoreError, TxStore};
pub use service::GatewayService;
pub use ws::{ClientHandle, SubscriptionRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
