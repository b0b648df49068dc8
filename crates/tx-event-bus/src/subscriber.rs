//! # Event Subscriber
//!
//! The consuming side of the feed: a [`Subscription`] token that yields
//! matching events until it is dropped.

use crate::events::{DataStoreEvent, EventFilter};
use thiserror::Error;
use tokio::sync::broadcast;

/// Why [`Subscription::recv`] returned no event.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus is gone; no further events will arrive.
    #[error("event feed closed")]
    Closed,

    /// The subscriber fell behind and this many events were overwritten.
    /// The subscription stays usable and resumes at the oldest retained event.
    #[error("event feed lagged, {0} events skipped")]
    Lagged(u64),
}

/// Source of data store events.
///
/// Subscribing returns a token; dropping it (or calling
/// [`Subscription::unsubscribe`]) detaches from the feed.
pub trait EventFeed: Send + Sync {
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// Live attachment to the feed.
pub struct Subscription {
    receiver: broadcast::Receiver<DataStoreEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<DataStoreEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Wait for the next event the filter accepts.
    ///
    /// Skipped events are reported once as [`SubscriptionError::Lagged`] so
    /// the caller can log them; the next call continues with fresh events.
    pub async fn recv(&mut self) -> Result<DataStoreEvent, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Ok(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return Err(SubscriptionError::Lagged(skipped))
                }
            }
        }
    }

    /// Detach from the feed. Same as dropping the token.
    pub fn unsubscribe(self) {}
}
