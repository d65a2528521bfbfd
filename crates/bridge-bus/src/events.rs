//! # Wallet Events
//!
//! The fixed taxonomy of agent-originated notifications and the delivery
//! scope rule that governs which subscribers observe each kind.

use bridge_types::WalletState;
use serde::{Deserialize, Serialize};

/// Stable prefix of every event name. Subscribers key off exact string
/// equality of the full name.
pub const EVENT_NAME_PREFIX: &str = "signer:";

/// How far a notification kind travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryScope {
    /// Delivered only to subscribers registered for the event's site origin.
    SiteScoped,
    /// Delivered to every subscriber; reflects agent-wide state.
    Broadcast,
}

/// Fixed enumeration of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// The active account connected to a site.
    Connected,
    /// The active account disconnected from a site.
    Disconnected,
    /// The connected tab changed.
    TabChanged,
    /// The active public key changed.
    ActiveKeyChanged,
    /// The wallet locked.
    Locked,
    /// The wallet unlocked.
    Unlocked,
}

impl EventKind {
    /// All kinds, in a fixed order.
    pub const ALL: [Self; 6] = [
        Self::Connected,
        Self::Disconnected,
        Self::TabChanged,
        Self::ActiveKeyChanged,
        Self::Locked,
        Self::Unlocked,
    ];

    /// The versioned wire name, e.g. `signer:connected`.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Connected => "signer:connected",
            Self::Disconnected => "signer:disconnected",
            Self::TabChanged => "signer:tabChanged",
            Self::ActiveKeyChanged => "signer:activeKeyChanged",
            Self::Locked => "signer:locked",
            Self::Unlocked => "signer:unlocked",
        }
    }

    /// Parse a wire name back into a kind.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_name() == name)
    }

    /// Delivery scope for this kind.
    ///
    /// Connection-related kinds concern one site; lock state and the active
    /// key are agent-wide.
    #[must_use]
    pub fn scope(&self) -> DeliveryScope {
        match self {
            Self::Connected | Self::Disconnected | Self::TabChanged => DeliveryScope::SiteScoped,
            Self::ActiveKeyChanged | Self::Locked | Self::Unlocked => DeliveryScope::Broadcast,
        }
    }
}

/// One notification as republished to page subscribers.
///
/// `detail` is the raw JSON string emitted by the agent, passed through
/// unmodified; the subscriber is responsible for parsing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEvent {
    /// Which notification this is.
    pub kind: EventKind,
    /// Site origin the event concerns. Present for site-scoped kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// JSON-encoded state payload, unmodified.
    pub detail: String,
}

impl WalletEvent {
    /// Create an event carrying a serialized [`WalletState`] snapshot.
    #[must_use]
    pub fn with_state(kind: EventKind, origin: Option<String>, state: &WalletState) -> Self {
        Self {
            kind,
            origin,
            detail: state.to_detail_json(),
        }
    }

    /// Parse the `detail` payload as a [`WalletState`] snapshot.
    pub fn state(&self) -> Result<WalletState, serde_json::Error> {
        WalletState::from_detail_json(&self.detail)
    }
}

/// Filter for subscribing to specific events.
///
/// The delivery scope rule is folded into [`EventFilter::matches`]: a
/// site-scoped event is only matched when the filter's origin equals the
/// event's origin, while broadcast events match regardless of origin.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
    /// The subscriber's site origin. Subscribers without an origin never
    /// observe site-scoped events.
    pub origin: Option<String>,
}

impl EventFilter {
    /// All broadcast events, and no site-scoped events.
    #[must_use]
    pub fn broadcast_only() -> Self {
        Self::default()
    }

    /// All events visible to a given site origin.
    #[must_use]
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            kinds: Vec::new(),
            origin: Some(origin.into()),
        }
    }

    /// Restrict to specific kinds.
    #[must_use]
    pub fn kinds(mut self, kinds: Vec<EventKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Check whether an event is observable through this filter.
    #[must_use]
    pub fn matches(&self, event: &WalletEvent) -> bool {
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind);

        let scope_match = match event.kind.scope() {
            DeliveryScope::Broadcast => true,
            DeliveryScope::SiteScoped => match (&self.origin, &event.origin) {
                (Some(mine), Some(theirs)) => mine == theirs,
                _ => false,
            },
        };

        kind_match && scope_match
    }
}
