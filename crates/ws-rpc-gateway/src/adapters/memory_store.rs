//! In-memory `TxStore`.
//!
//! Backs the standalone binary and the test suites. Keys are normalized on
//! insert so lookups match what the fan-out asks for.

use crate::domain::notification::{TxRecord, TxStatus};
use crate::domain::topic::normalize_hash_string;
use crate::ports::outbound::{StoreError, TxStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Default)]
struct StoreState {
    txs: HashMap<String, TxRecord>,
    balances: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    failure: Option<StoreError>,
}

/// Thread-safe in-memory transaction and balance store.
#[derive(Default)]
pub struct InMemoryTxStore {
    state: RwLock<StoreState>,
}

impl InMemoryTxStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a transaction. Invalid hex ids are ignored.
    pub fn upsert_tx(&self, tx_id: &str, tx_status: TxStatus) {
        let Some(tx_id) = normalize_hash_string(tx_id) else {
            return;
        };
        self.state.write().txs.insert(
            tx_id.clone(),
            TxRecord { tx_id, tx_status },
        );
    }

    /// Set an address balance.
    pub fn set_balance(&self, address: impl Into<String>, balance: impl Into<String>) {
        self.state
            .write()
            .balances
            .insert(address.into(), balance.into());
    }

    /// Make lookups of one transaction sleep before answering.
    pub fn delay_tx(&self, tx_id: &str, delay: Duration) {
        if let Some(tx_id) = normalize_hash_string(tx_id) {
            self.state.write().delays.insert(tx_id, delay);
        }
    }

    /// Make every lookup fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<StoreError>) {
        self.state.write().failure = error;
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match &self.state.read().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TxStore for InMemoryTxStore {
    async fn get_tx(&self, tx_id: &str) -> Result<Option<TxRecord>, StoreError> {
        let delay = self.state.read().delays.get(tx_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;
        Ok(self.state.read().txs.get(tx_id).cloned())
    }

    async fn get_address_balance(&self, address: &str) -> Result<Option<String>, StoreError> {
        self.check_failure()?;
        Ok(self.state.read().balances.get(address).cloned())
    }
}
