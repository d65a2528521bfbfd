//! # Event Hub
//!
//! The publishing side of the notification hub.

use crate::events::{EventFilter, WalletEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for republishing agent notifications to the hub.
///
/// The channel listener is the only producer in practice; the trait exists so
/// tests and embedding hosts can inject their own hub.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the hub.
    ///
    /// Returns the number of active subscribers that received the event.
    async fn publish(&self, event: WalletEvent) -> usize;

    /// Total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory notification hub.
///
/// Uses `tokio::sync::broadcast` for multi-consumer fan-out; scope filtering
/// happens on the subscriber side so one channel serves every origin.
pub struct InMemoryEventHub {
    /// Broadcast sender for events.
    sender: broadcast::Sender<WalletEvent>,

    /// Active subscription count by origin.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventHub {
    /// Create a hub with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a hub with the given per-subscriber buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// No buffering across subscription gaps: a subscriber that attaches
    /// late misses earlier notifications.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let origin_key = filter.origin.clone().unwrap_or_else(|| "<broadcast>".into());

        {
            if let Ok(mut subs) = self.subscriptions.write() {
                *subs.entry(origin_key.clone()).or_insert(0) += 1;
            }
        }

        debug!(origin = %origin_key, kinds = ?filter.kinds, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), origin_key)
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-subscriber buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventHub {
    async fn publish(&self, event: WalletEvent) -> usize {
        let kind = event.kind;

        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    kind = %kind.event_name(),
                    receivers = receiver_count,
                    "Notification published"
                );
                receiver_count
            }
            Err(e) => {
                // No receivers - the notification is dropped
                warn!(
                    kind = %kind.event_name(),
                    error = %e,
                    "Notification dropped (no subscribers)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
