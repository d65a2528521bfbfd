//! # Bridge Bus - State Notification Hub
//!
//! Re-publishes custody-agent state notifications to page subscribers.
//!
//! ## Fan-out
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Channel    │                    │  Subscriber  │
//! │   Listener   │    publish()       │  (page code) │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Hub   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery scope
//!
//! Connected/Disconnected/TabChanged are delivered only to subscribers of
//! the event's site origin; Locked/Unlocked/ActiveKeyChanged are broadcast
//! to every subscriber, since they reflect agent-wide state.
//!
//! ## Limitations (by contract)
//!
//! No buffering across subscription gaps: a subscriber that attaches late
//! misses earlier notifications. No ordering guarantee beyond "delivered in
//! the order the agent emitted them".

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod hub;
pub mod subscriber;

// Re-export main types
pub use events::{DeliveryScope, EventFilter, EventKind, WalletEvent, EVENT_NAME_PREFIX};
pub use hub::{EventPublisher, InMemoryEventHub};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging subscribers skip.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
