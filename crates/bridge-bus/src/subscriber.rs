//! # Event Subscriber
//!
//! The subscription side of the notification hub.

use crate::events::{EventFilter, WalletEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The hub was dropped.
    #[error("Event hub closed")]
    Closed,
}

/// Trait for subscribing to events from the hub.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// Accounting handle shared by [`Subscription`] and [`EventStream`].
///
/// Dropping it removes the subscriber from the hub's per-origin counts, so
/// page navigation cannot leak subscribers.
struct SubscriptionGuard {
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    origin_key: String,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        // Decrement subscription count
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.origin_key) else {
            debug!(origin = %self.origin_key, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.origin_key);
        }
        debug!(origin = %self.origin_key, "Subscription dropped");
    }
}

/// A subscription handle for receiving events.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<WalletEvent>,

    /// Filter for this subscription (kinds + delivery scope).
    filter: EventFilter,

    /// Hub accounting, released on drop.
    guard: SubscriptionGuard,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<WalletEvent>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        origin_key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            guard: SubscriptionGuard {
                subscriptions,
                origin_key,
            },
        }
    }

    /// Receive the next event observable through this subscription's filter.
    ///
    /// Returns `None` when the hub has been dropped.
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some notifications dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
            // Event is outside this subscriber's scope, keep waiting
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// - `Ok(Some(event))` - an event was available and matched
    /// - `Ok(None)` - no event available (would block)
    /// - `Err(SubscriptionError::Closed)` - the hub was dropped
    pub fn try_recv(&mut self) -> Result<Option<WalletEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
            // Out-of-scope event, try again
        }
    }

    /// The filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators. The
/// waker is registered by the underlying broadcast receiver, so an empty
/// stream parks until the next publish instead of re-polling.
pub struct EventStream {
    inner: BroadcastStream<WalletEvent>,
    filter: EventFilter,
    _guard: SubscriptionGuard,
}

impl EventStream {
    /// Create a new event stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription {
            receiver,
            filter,
            guard,
        } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
            _guard: guard,
        }
    }

    /// The filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = WalletEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.filter.matches(&event) {
                        return Poll::Ready(Some(event));
                    }
                    // Out-of-scope event, poll again
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some notifications dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
