//! Push notification payloads and the data they are built from.

use serde::{Deserialize, Serialize};

/// Transaction status as reported by the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// In the mempool
    Pending,
    /// Confirmed and executed
    Success,
    /// Confirmed, aborted by the contract response
    AbortByResponse,
    /// Confirmed, aborted by a post-condition
    AbortByPostCondition,
    /// Dropped: replaced by a higher fee transaction
    DroppedReplaceByFee,
    /// Dropped: replaced on another fork
    DroppedReplaceAcrossFork,
    /// Dropped: fee too low to ever be mined
    DroppedTooExpensive,
    /// Dropped: garbage collected from the mempool
    DroppedStaleGarbageCollect,
}

/// Transaction record returned by the data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Transaction id, normalized hex
    pub tx_id: String,
    /// Current status
    pub tx_status: TxStatus,
}

/// `params` of a `tx_update` push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxUpdateNotification {
    pub tx_id: String,
    pub tx_status: TxStatus,
}

/// `params` of an `address_tx_update` push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressTxUpdateNotification {
    pub address: String,
    pub tx_id: String,
    pub tx_status: TxStatus,
}

/// `params` of an `address_balance_update` push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBalanceNotification {
    pub address: String,
    /// Decimal string; balances exceed the range of JSON numbers
    pub balance: String,
}
