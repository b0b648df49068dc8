//! # Data Store Events
//!
//! State changes announced by the data store.

use serde::{Deserialize, Serialize};

/// All events that can be published to the bus.
///
/// Ids and addresses are carried exactly as the data store reported them;
/// consumers normalize before using them as lookup keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataStoreEvent {
    /// A transaction's status changed.
    TxUpdate {
        /// Transaction id (hex, any prefix/case).
        tx_id: String,
    },

    /// A transaction touching an address changed status.
    AddressTxUpdate {
        /// The affected address.
        address: String,
        /// Transaction id (hex, any prefix/case).
        tx_id: String,
    },

    /// An address balance changed.
    AddressBalanceUpdate {
        /// The affected address.
        address: String,
    },
}

impl DataStoreEvent {
    /// Convenience constructor for a transaction status change.
    pub fn tx_update(tx_id: impl Into<String>) -> Self {
        Self::TxUpdate {
            tx_id: tx_id.into(),
        }
    }

    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TxUpdate { .. } => EventTopic::TxUpdate,
            Self::AddressTxUpdate { .. } => EventTopic::AddressTxUpdate,
            Self::AddressBalanceUpdate { .. } => EventTopic::AddressBalanceUpdate,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Transaction status changes.
    TxUpdate,
    /// Per-address transaction activity.
    AddressTxUpdate,
    /// Per-address balance changes.
    AddressBalanceUpdate,
}

/// The set of topics a subscription wants delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Accept only the listed topics.
    #[must_use]
    pub fn topics(topics: impl IntoIterator<Item = EventTopic>) -> Self {
        Self {
            topics: topics.into_iter().collect(),
        }
    }

    /// Whether the filter accepts nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn matches(&self, event: &DataStoreEvent) -> bool {
        self.topics.contains(&event.topic())
    }
}
