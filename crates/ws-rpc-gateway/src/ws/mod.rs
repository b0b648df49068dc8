//! WebSocket side of the gateway.
//!
//! - `registry`: topic → client handles
//! - `router`: `subscribe` / `unsubscribe` handling and batch replies
//! - `fanout`: data store events → pushes
//! - `handler`: per-connection read/write loops and limits

pub mod client;
pub mod fanout;
pub mod handler;
pub mod registry;
pub mod router;

pub use client::{ClientHandle, SendError, WsClient};
pub use fanout::NotificationFanout;
pub use handler::{ConnectionContext, WebSocketHandler};
pub use registry::SubscriptionRegistry;
pub use router::{ClientRegistry, RequestRouter};
