//! # Event Publisher
//!
//! The producing side of the feed and the in-process bus that carries it.

use crate::events::{DataStoreEvent, EventFilter};
use crate::subscriber::{EventFeed, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the feed. The data store calls this after
/// committing a change.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Returns how many subscriptions it was handed to.
    async fn publish(&self, event: DataStoreEvent) -> usize;
}

/// In-process event bus over a `tokio::sync::broadcast` channel.
///
/// Filtering happens on the receiving side, so every live subscription
/// counts as a receiver regardless of its topics.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DataStoreEvent>,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus retaining at most `capacity` unread events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFeed for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(filter = ?filter, "New event feed subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DataStoreEvent) -> usize {
        let topic = event.topic();
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(topic = ?topic, receivers, "Event published");
                receivers
            }
            Err(_) => {
                // Nobody is listening; the gateway may not be up yet.
                trace!(topic = ?topic, "Event dropped (no receivers)");
                0
            }
        }
    }
}
