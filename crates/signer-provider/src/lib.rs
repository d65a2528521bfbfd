//! Signer Provider - typed operations over a fire-and-forget agent channel.
//!
//! This crate turns the shared messaging channel to a key-custody agent into
//! a set of strongly-typed awaitable operations with timeouts, plus
//! out-of-band state notifications.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SIGNER PROVIDER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │                  Provider Facade                      │  │
//! │  │   connect / switch / sign / signMessage / queries     │  │
//! │  └───────────┬──────────────────────────────▲────────────┘  │
//! │              │ register                     │ resolve       │
//! │  ┌───────────▼──────────────────────────────┴────────────┐  │
//! │  │          Pending Request Store (oneshot)              │  │
//! │  └───────────▲──────────────────────────────┬────────────┘  │
//! │              │ complete                     │               │
//! │  ┌───────────┴────────────┐   ┌─────────────▼────────────┐  │
//! │  │    Channel Listener    │──▶│   Notification Hub       │  │
//! │  │  (decode + demux)      │   │   (bridge-bus)           │  │
//! │  └───────────▲────────────┘   └──────────────────────────┘  │
//! └──────────────┼──────────────────────────────────────────────┘
//!                │
//!         shared channel ◀──── custody agent (external)
//! ```
//!
//! # Correctness
//!
//! Responses are correlated purely by id, never by send order; out-of-order
//! responses are fine. Resolution is exactly-once: response, timeout, and
//! channel failure race for a single atomic map removal, and the losers are
//! silent no-ops.
//!
//! # Usage
//!
//! ```ignore
//! use signer_provider::{channel, ProviderConfig, SignerProvider};
//! use std::sync::Arc;
//!
//! let (agent_channel, inbound, endpoint) = channel::paired(64);
//! let provider = SignerProvider::new(ProviderConfig::default(), Arc::new(agent_channel), inbound)?;
//! let connected = provider.request_connection().await?;
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod codec;
pub mod domain;
pub mod listener;
pub mod provider;

// Re-exports for public API
pub use channel::{AgentChannel, AgentEndpoint, ChannelError, PairedChannel};
pub use codec::{decode_frame, encode_request, CodecError, InboundFrame};
pub use domain::config::{ConfigError, ProviderConfig};
pub use domain::error::ProviderError;
pub use domain::pending::{AgentResponse, PendingRequestStore, PendingStats};
pub use listener::{ChannelListener, ListenerHandle};
pub use provider::SignerProvider;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
