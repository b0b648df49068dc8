//! Ports for the gateway.
//!
//! The data store is the only driven dependency; the event feed comes from
//! `tx-event-bus`.

pub mod outbound;

pub use outbound::{StoreError, TxStore};
