//! Event bus shared by the host and its plugins.
//!
//! Handlers are plain callbacks invoked synchronously on the publishing thread. They
//! subscribe by event kind, or to `"*"` to see every event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subscription key matching every event kind.
pub const WILDCARD: &str = "*";

/// Event metadata for tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event ID
    pub event_id: String,
    /// Event source (component that published)
    pub source: String,
    /// Event timestamp, Unix seconds
    pub timestamp: i64,
}

impl EventMetadata {
    /// Create new event metadata.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            source: source.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// An event flowing through the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Dotted kind such as `host.started`.
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    pub metadata: EventMetadata,
}

impl Event {
    /// Event published by the host.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self::from_source("host", kind, payload)
    }

    /// Event published by `source`, usually a plugin identity.
    pub fn from_source(source: impl Into<String>, kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            metadata: EventMetadata::new(source),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked for every matching event.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    kind: String,
    handler: EventHandler,
}

/// Publish/subscribe hub.
pub struct EventBus {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    /// Create a new event bus with no subscribers.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    /// Call `handler` for every event of `kind` (or every event for [`WILDCARD`]).
    pub fn subscribe<F>(&self, kind: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().push(Subscription {
            id,
            kind: kind.into(),
            handler: Arc::new(handler),
        });
        id
    }

    /// Drop a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Deliver `event` to every matching handler in subscription order.
    ///
    /// Returns the number of handlers invoked. Handlers run outside the bus lock and may
    /// publish or subscribe themselves.
    pub fn publish(&self, event: &Event) -> usize {
        let handlers: Vec<EventHandler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.kind == WILDCARD || s.kind == event.kind)
            .map(|s| s.handler.clone())
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Get the number of current subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Shared event bus handle.
pub type SharedEventBus = Arc<EventBus>;
