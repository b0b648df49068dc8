//! Notification fan-out.
//!
//! Turns data store events into pushes. Each event is handled on its own
//! task so a slow lookup never holds up unrelated events. A payload is
//! serialized once and the same bytes go to every subscriber.

use crate::domain::notification::{
    AddressBalanceNotification, AddressTxUpdateNotification, TxRecord, TxUpdateNotification,
};
use crate::domain::topic::{normalize_hash_string, Topic};
use crate::middleware::GatewayMetrics;
use crate::ports::outbound::{StoreError, TxStore};
use crate::protocol::JsonRpcNotification;
use crate::ws::client::ClientHandle;
use crate::ws::router::ClientRegistry;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};
use tx_event_bus::{DataStoreEvent, EventFilter, EventTopic, Subscription, SubscriptionError};

/// Pushes notifications for data store events to subscribed clients.
pub struct NotificationFanout {
    registry: Arc<ClientRegistry>,
    store: Arc<dyn TxStore>,
    metrics: Arc<GatewayMetrics>,
}

impl NotificationFanout {
    pub fn new(
        registry: Arc<ClientRegistry>,
        store: Arc<dyn TxStore>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            store,
            metrics,
        }
    }

    /// The topics the fan-out has handlers for.
    pub fn event_filter() -> EventFilter {
        EventFilter::topics([
            EventTopic::TxUpdate,
            EventTopic::AddressTxUpdate,
            EventTopic::AddressBalanceUpdate,
        ])
    }

    /// Run the dispatcher until `shutdown` flips or the feed closes.
    ///
    /// On exit the feed subscription is dropped (detaching it) and any
    /// per-event tasks still waiting on the store are aborted and reaped.
    pub fn spawn(
        self: Arc<Self>,
        mut events: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                    event = events.recv() => match event {
                        Ok(event) => {
                            let fanout = Arc::clone(&self);
                            in_flight.spawn(async move {
                                fanout.handle_event(event).await;
                            });
                        }
                        Err(SubscriptionError::Lagged(skipped)) => {
                            warn!(skipped, "Event feed lagged, notifications lost");
                        }
                        Err(SubscriptionError::Closed) => {
                            warn!("Event feed closed");
                            break;
                        }
                    },
                }
            }
            events.unsubscribe();
            in_flight.abort_all();
            while in_flight.join_next().await.is_some() {}
            info!("Notification fan-out stopped");
        })
    }

    /// Handle one event. Returns the number of clients the push was
    /// enqueued for.
    pub async fn handle_event(&self, event: DataStoreEvent) -> usize {
        self.metrics.record_event();
        match event {
            DataStoreEvent::TxUpdate { tx_id } => self.on_tx_update(&tx_id).await,
            DataStoreEvent::AddressTxUpdate { address, tx_id } => {
                self.on_address_tx_update(address, &tx_id).await
            }
            DataStoreEvent::AddressBalanceUpdate { address } => {
                self.on_address_balance_update(address).await
            }
        }
    }

    async fn on_tx_update(&self, raw_tx_id: &str) -> usize {
        let Some(topic) = Topic::tx(raw_tx_id) else {
            debug!(tx_id = %raw_tx_id, "Ignoring tx event with invalid id");
            return 0;
        };
        if !self.registry.has_subscribers(&topic) {
            return 0;
        }

        let Some(record) = self.fetch_tx(topic.key()).await else {
            return 0;
        };
        let payload = TxUpdateNotification {
            tx_id: topic.key().to_string(),
            tx_status: record.tx_status,
        };
        self.push(&topic, payload)
    }

    async fn on_address_tx_update(&self, address: String, raw_tx_id: &str) -> usize {
        let topic = Topic::address_tx(address);
        if !self.registry.has_subscribers(&topic) {
            return 0;
        }

        let Some(tx_id) = normalize_hash_string(raw_tx_id) else {
            debug!(tx_id = %raw_tx_id, "Ignoring address tx event with invalid id");
            return 0;
        };
        let Some(record) = self.fetch_tx(&tx_id).await else {
            return 0;
        };
        let payload = AddressTxUpdateNotification {
            address: topic.key().to_string(),
            tx_id,
            tx_status: record.tx_status,
        };
        self.push(&topic, payload)
    }

    async fn on_address_balance_update(&self, address: String) -> usize {
        let topic = Topic::address_balance(address);
        if !self.registry.has_subscribers(&topic) {
            return 0;
        }

        let balance = match self.store.get_address_balance(topic.key()).await {
            Ok(Some(balance)) => balance,
            Ok(None) => {
                self.metrics.record_not_found();
                debug!(address = %topic.key(), "Balance not found, skipping notification");
                return 0;
            }
            Err(e) => {
                self.store_failed(&topic, &e);
                return 0;
            }
        };
        let payload = AddressBalanceNotification {
            address: topic.key().to_string(),
            balance,
        };
        self.push(&topic, payload)
    }

    async fn fetch_tx(&self, tx_id: &str) -> Option<TxRecord> {
        match self.store.get_tx(tx_id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                self.metrics.record_not_found();
                debug!(tx_id = %tx_id, "Transaction not found, skipping notification");
                None
            }
            Err(e) => {
                self.metrics.record_store_error();
                warn!(tx_id = %tx_id, error = %e, "Transaction lookup failed");
                None
            }
        }
    }

    fn store_failed(&self, topic: &Topic, error: &StoreError) {
        self.metrics.record_store_error();
        warn!(topic = %topic, error = %error, "Data store lookup failed");
    }

    /// Push to whoever is subscribed to `topic` now, after the lookup.
    /// Clients that left while the store was queried get nothing; clients
    /// that joined in the meantime are included.
    fn push<P: Serialize>(&self, topic: &Topic, params: P) -> usize {
        let subscribers = self.registry.subscribers(topic);
        if subscribers.is_empty() {
            debug!(topic = %topic, "Subscribers left during lookup");
            return 0;
        }

        let kind = topic.kind();
        let text: Arc<str> = match JsonRpcNotification::new(kind.as_str(), params).to_text() {
            Ok(text) => text.into(),
            Err(e) => {
                warn!(method = %kind, error = %e, "Failed to serialize notification");
                return 0;
            }
        };

        let mut delivered = 0;
        for client in &subscribers {
            match client.send(Arc::clone(&text)) {
                Ok(()) => {
                    delivered += 1;
                    self.metrics.record_push(true);
                }
                Err(e) => {
                    self.metrics.record_push(false);
                    warn!(client = %client.id(), method = %kind, error = %e, "Dropped notification");
                }
            }
        }

        debug!(method = %kind, subscribers = subscribers.len(), delivered, "Notification fanned out");
        delivered
    }
}
