//! Transport port to the custody agent.
//!
//! The bridge only ever sees a fire-and-forget outbound sender and a stream
//! of inbound frames; [`AgentChannel`] is the seam where a host environment
//! plugs in its real messaging surface. An mpsc-backed pair is provided for
//! in-process use and for the test suite's scripted agent.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The agent side of the channel is gone.
    #[error("channel closed")]
    Closed,
}

/// Outbound port to the agent.
#[async_trait]
pub trait AgentChannel: Send + Sync {
    /// Whether the agent's provider object has attached. Operations check
    /// this before registering anything, so an absent agent fails fast
    /// instead of burning a timeout window.
    fn is_attached(&self) -> bool;

    /// Send one encoded request frame.
    async fn send(&self, frame: serde_json::Value) -> Result<(), ChannelError>;
}

/// Provider-side half of an in-process channel pair.
pub struct PairedChannel {
    outbound: mpsc::Sender<serde_json::Value>,
    attached: Arc<AtomicBool>,
}

#[async_trait]
impl AgentChannel for PairedChannel {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire) && !self.outbound.is_closed()
    }

    async fn send(&self, frame: serde_json::Value) -> Result<(), ChannelError> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

/// Agent-side endpoint of an in-process channel pair.
///
/// Whoever plays the agent reads requests from `requests` and pushes
/// response/notification frames into `inbound`.
pub struct AgentEndpoint {
    /// Request frames sent by the provider.
    pub requests: mpsc::Receiver<serde_json::Value>,
    /// Sender for response and notification frames.
    pub inbound: mpsc::Sender<serde_json::Value>,
    attached: Arc<AtomicBool>,
}

impl AgentEndpoint {
    /// Flip the attachment flag the provider's fail-fast check reads.
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::Release);
    }
}

/// Create an in-process channel pair.
///
/// Returns the provider-side channel, the inbound frame receiver to hand to
/// the channel listener, and the agent-side endpoint. The pair starts
/// attached.
#[must_use]
pub fn paired(
    capacity: usize,
) -> (
    PairedChannel,
    mpsc::Receiver<serde_json::Value>,
    AgentEndpoint,
) {
    let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
    let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
    let attached = Arc::new(AtomicBool::new(true));

    let channel = PairedChannel {
        outbound: outbound_tx,
        attached: attached.clone(),
    };
    let endpoint = AgentEndpoint {
        requests: outbound_rx,
        inbound: inbound_tx,
        attached,
    };

    (channel, inbound_rx, endpoint)
}
