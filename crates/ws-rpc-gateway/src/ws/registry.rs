//! Topic → subscriber registry.
//!
//! Every operation is a single critical section on one mutex. Callers get
//! snapshots (`Vec<Arc<C>>`) and do their I/O after the lock is released.
//!
//! Invariants:
//! - a topic entry exists iff it has at least one subscriber
//! - a client appears at most once per topic
//! - `by_client` mirrors `topics` exactly

use crate::domain::client_id::ClientId;
use crate::ws::client::ClientHandle;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

struct RegistryState<T, C: ?Sized> {
    topics: HashMap<T, HashMap<ClientId, Arc<C>>>,
    by_client: HashMap<ClientId, HashSet<T>>,
}

/// Subscription registry, generic over topic and client type.
pub struct SubscriptionRegistry<T, C: ?Sized> {
    state: Mutex<RegistryState<T, C>>,
}

impl<T, C> SubscriptionRegistry<T, C>
where
    T: Eq + Hash + Clone + std::fmt::Display,
    C: ClientHandle + ?Sized,
{
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                topics: HashMap::new(),
                by_client: HashMap::new(),
            }),
        }
    }

    /// Subscribe `client` to `topic`. Returns false if it already was.
    pub fn add(&self, topic: T, client: Arc<C>) -> bool {
        let client_id = client.id();
        let mut state = self.state.lock();

        let subscribers = state.topics.entry(topic.clone()).or_default();
        if subscribers.contains_key(&client_id) {
            return false;
        }
        subscribers.insert(client_id, client);
        debug!(topic = %topic, client = %client_id, "Subscription added");
        state.by_client.entry(client_id).or_default().insert(topic);
        true
    }

    /// Unsubscribe a client from one topic. No-op if it was not subscribed.
    pub fn remove(&self, topic: &T, client_id: ClientId) -> bool {
        let mut state = self.state.lock();

        let removed = match state.topics.get_mut(topic) {
            Some(subscribers) => {
                let removed = subscribers.remove(&client_id).is_some();
                if subscribers.is_empty() {
                    state.topics.remove(topic);
                }
                removed
            }
            None => false,
        };

        if removed {
            if let Some(client_topics) = state.by_client.get_mut(&client_id) {
                client_topics.remove(topic);
                if client_topics.is_empty() {
                    state.by_client.remove(&client_id);
                }
            }
            debug!(topic = %topic, client = %client_id, "Subscription removed");
        }
        removed
    }

    /// Purge a client from every topic. Returns how many topics it left.
    pub fn remove_all(&self, client_id: ClientId) -> usize {
        let mut state = self.state.lock();

        let Some(client_topics) = state.by_client.remove(&client_id) else {
            return 0;
        };

        for topic in &client_topics {
            if let Some(subscribers) = state.topics.get_mut(topic) {
                subscribers.remove(&client_id);
                if subscribers.is_empty() {
                    state.topics.remove(topic);
                }
            }
        }

        debug!(
            client = %client_id,
            topics = client_topics.len(),
            "Removed all subscriptions for client"
        );
        client_topics.len()
    }

    /// Snapshot of the current subscribers of a topic.
    pub fn subscribers(&self, topic: &T) -> Vec<Arc<C>> {
        self.state
            .lock()
            .topics
            .get(topic)
            .map(|subscribers| subscribers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a topic has any subscriber.
    pub fn has_subscribers(&self, topic: &T) -> bool {
        self.state.lock().topics.contains_key(topic)
    }

    /// Number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.state.lock().topics.len()
    }

    /// Total (topic, client) pairs.
    pub fn subscription_count(&self) -> usize {
        self.state.lock().topics.values().map(HashMap::len).sum()
    }

    /// Clients holding at least one subscription.
    pub fn client_count(&self) -> usize {
        self.state.lock().by_client.len()
    }
}

impl<T, C> Default for SubscriptionRegistry<T, C>
where
    T: Eq + Hash + Clone + std::fmt::Display,
    C: ClientHandle + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}
