//! # Outbound Ports (Driven Ports)
//!
//! Lookups the gateway needs from the backing data store.

use crate::domain::notification::TxRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Data store failures. Not-found is never an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    /// The query ran but failed.
    #[error("data store query failed: {0}")]
    Query(String),
}

/// Read access to transaction and balance data.
///
/// Production: an adapter over the indexer database.
/// Testing: `InMemoryTxStore` (adapters/memory_store.rs)
#[async_trait]
pub trait TxStore: Send + Sync {
    /// Fetch a transaction by normalized id.
    ///
    /// Returns `Ok(None)` when the store has no such transaction.
    async fn get_tx(&self, tx_id: &str) -> Result<Option<TxRecord>, StoreError>;

    /// Fetch an address balance as a decimal string.
    ///
    /// Returns `Ok(None)` when the address is unknown.
    async fn get_address_balance(&self, address: &str) -> Result<Option<String>, StoreError>;
}
