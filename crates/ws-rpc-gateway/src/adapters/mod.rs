//! Adapters for the gateway.
//!
//! Infrastructure implementations of the outbound ports.

pub mod memory_store;

pub use memory_store::InMemoryTxStore;
