//! Topic-keyed event bus
//!
//! Subscribers register a callback under a topic and get back a
//! [`Subscription`] handle for unsubscribing. Callbacks for a topic are
//! invoked in the order they subscribed.

use std::collections::HashMap;
use std::hash::Hash;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Registry of callbacks keyed by topic
pub struct EventBus<T, E> {
    /// Topic -> callbacks in subscription order
    subscribers: HashMap<T, Vec<(Subscription, Callback<E>)>>,
    /// Subscription -> topic, for unsubscribing
    topics: HashMap<Subscription, T>,
    next_id: u64,
}

impl<T, E> Default for EventBus<T, E> {
    fn default() -> Self {
        Self {
            subscribers: HashMap::new(),
            topics: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T, E> std::fmt::Debug for EventBus<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.topics.len())
            .finish()
    }
}

impl<T: Clone + Eq + Hash, E> EventBus<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `topic`
    pub fn subscribe(&mut self, topic: T, callback: impl FnMut(&E) + 'static) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(topic.clone())
            .or_default()
            .push((subscription, Box::new(callback)));
        self.topics.insert(subscription, topic);
        subscription
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let Some(topic) = self.topics.remove(&subscription) else {
            return false;
        };
        if let Some(callbacks) = self.subscribers.get_mut(&topic) {
            callbacks.retain(|(s, _)| *s != subscription);
            if callbacks.is_empty() {
                self.subscribers.remove(&topic);
            }
        }
        true
    }

    /// Deliver `event` to every subscriber of `topic`
    pub fn publish(&mut self, topic: &T, event: &E) {
        if let Some(callbacks) = self.subscribers.get_mut(topic) {
            for (_, callback) in callbacks.iter_mut() {
                callback(event);
            }
        }
    }

    /// Number of subscribers for `topic`
    pub fn subscriber_count(&self, topic: &T) -> usize {
        self.subscribers.get(topic).map_or(0, Vec::len)
    }
}
