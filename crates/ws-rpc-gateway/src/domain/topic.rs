//! Subscription topics and the `params` object that names them.

use crate::domain::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three notification streams a client can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    /// Status changes of one transaction
    TxUpdate,
    /// Transactions touching one address
    AddressTxUpdate,
    /// Balance changes of one address
    AddressBalanceUpdate,
}

impl TopicKind {
    /// Wire name, also used as the push notification method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TxUpdate => "tx_update",
            Self::AddressTxUpdate => "address_tx_update",
            Self::AddressBalanceUpdate => "address_balance_update",
        }
    }

    /// Look up a kind by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tx_update" => Some(Self::TxUpdate),
            "address_tx_update" => Some(Self::AddressTxUpdate),
            "address_balance_update" => Some(Self::AddressBalanceUpdate),
            _ => None,
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscription key: kind plus the (normalized) id or address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic {
    kind: TopicKind,
    key: String,
}

impl Topic {
    /// Topic for a transaction. Returns `None` unless `tx_id` is valid hex.
    pub fn tx(tx_id: &str) -> Option<Self> {
        normalize_hash_string(tx_id).map(|key| Self {
            kind: TopicKind::TxUpdate,
            key,
        })
    }

    /// Topic for transactions touching an address. Addresses are used verbatim.
    pub fn address_tx(address: impl Into<String>) -> Self {
        Self {
            kind: TopicKind::AddressTxUpdate,
            key: address.into(),
        }
    }

    /// Topic for an address balance. Addresses are used verbatim.
    pub fn address_balance(address: impl Into<String>) -> Self {
        Self {
            kind: TopicKind::AddressBalanceUpdate,
            key: address.into(),
        }
    }

    /// Topic kind
    pub fn kind(&self) -> TopicKind {
        self.kind
    }

    /// Normalized tx id or address
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Normalize a hex hash: strip `0x`/`0X`, require non-empty even-length hex,
/// return lowercase.
pub fn normalize_hash_string(raw: &str) -> Option<String> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    hex::decode(digits).ok().map(hex::encode)
}

/// `params` of a `subscribe` / `unsubscribe` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SubscriptionRequest {
    /// Follow one transaction
    TxUpdate {
        /// Transaction id in any hex form
        tx_id: String,
    },
    /// Follow transactions touching an address
    AddressTxUpdate {
        /// Address, unvalidated
        address: String,
    },
    /// Follow an address balance
    AddressBalanceUpdate {
        /// Address, unvalidated
        address: String,
    },
}

impl SubscriptionRequest {
    /// Validate raw request params.
    ///
    /// Checks run in a fixed order so each failure carries a specific
    /// message: missing event, unknown event, then per-kind fields.
    pub fn from_params(params: Option<&serde_json::Value>) -> Result<Self, ApiError> {
        // A null or empty event counts as absent.
        let event = params
            .and_then(|p| p.get("event"))
            .filter(|event| !event.is_null() && event.as_str() != Some(""))
            .ok_or_else(|| {
                ApiError::invalid_params("subscription requests must include an event name")
            })?;

        let kind = event
            .as_str()
            .and_then(TopicKind::from_name)
            .ok_or_else(|| {
                ApiError::invalid_params("subscription request must use a valid event name")
            })?;

        let field_error = || match kind {
            TopicKind::TxUpdate => ApiError::invalid_params("invalid tx_id"),
            _ => ApiError::invalid_params("invalid address"),
        };

        // `params` is known to exist here
        let value = params.cloned().unwrap_or_default();
        serde_json::from_value(value).map_err(|_| field_error())
    }

    /// Resolve into a registry topic, normalizing transaction ids.
    pub fn into_topic(self) -> Result<Topic, ApiError> {
        match self {
            Self::TxUpdate { tx_id } => {
                Topic::tx(&tx_id).ok_or_else(|| ApiError::invalid_params("invalid tx_id"))
            }
            Self::AddressTxUpdate { address } => Ok(Topic::address_tx(address)),
            Self::AddressBalanceUpdate { address } => Ok(Topic::address_balance(address)),
        }
    }
}
