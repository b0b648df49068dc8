//! # Tx Event Bus - Data Store Event Feed
//!
//! The data store announces state changes (a transaction's status moved, an
//! address saw a new transaction, an address balance changed) on this bus.
//! Consumers such as the WebSocket gateway take a [`Subscription`] and read
//! events from it until they drop the handle.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Data Store  │                    │   Gateway    │
//! │              │    publish()       │   Fan-out    │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe() -> token
//! ```
//!
//! ## Delivery
//!
//! - At-least-once, in-process only
//! - No ordering guarantee across distinct ids
//! - A published event does not imply the record is already queryable
//! - Slow subscribers skip what they missed and are told how much
//!   ([`SubscriptionError::Lagged`])

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{DataStoreEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventFeed, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
