//! Channel listener: the single subscription point on the shared channel.
//!
//! One spawned task owns the inbound receiver for the lifetime of the
//! provider. Each frame is decoded and routed: responses to the correlation
//! table, notifications to the hub, anything undecodable dropped with a log
//! line. A fault while handling one frame never stops the loop, and when the
//! inbound channel closes every outstanding request is failed with
//! `ChannelClosed` before the task exits.

use crate::codec::{decode_frame, InboundFrame};
use crate::domain::error::ProviderError;
use crate::domain::pending::PendingRequestStore;
use bridge_bus::{EventPublisher, InMemoryEventHub};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// The listener task and its wiring.
pub struct ChannelListener {
    pending: Arc<PendingRequestStore>,
    hub: Arc<InMemoryEventHub>,
    inbound: mpsc::Receiver<serde_json::Value>,
}

impl ChannelListener {
    /// Wire a listener to the correlation table and notification hub.
    #[must_use]
    pub fn new(
        pending: Arc<PendingRequestStore>,
        hub: Arc<InMemoryEventHub>,
        inbound: mpsc::Receiver<serde_json::Value>,
    ) -> Self {
        Self {
            pending,
            hub,
            inbound,
        }
    }

    /// Spawn the listener loop.
    #[must_use]
    pub fn spawn(self) -> ListenerHandle {
        ListenerHandle {
            task: tokio::spawn(self.run()),
        }
    }

    /// Run the listener loop until the inbound channel closes.
    pub async fn run(mut self) {
        while let Some(frame) = self.inbound.recv().await {
            self.handle_frame(frame).await;
        }

        let failed = self.pending.fail_all(&ProviderError::ChannelClosed);
        if failed > 0 {
            warn!(failed = failed, "Inbound channel closed with requests outstanding");
        } else {
            debug!("Inbound channel closed, listener stopping");
        }
    }

    /// Decode and route one frame. Failure here affects only this frame.
    async fn handle_frame(&self, frame: serde_json::Value) {
        match decode_frame(&frame) {
            Ok(InboundFrame::Response(response)) => {
                let result = if response.ok {
                    Ok(response.result.unwrap_or(serde_json::Value::Null))
                } else {
                    let error = response
                        .error
                        .unwrap_or_else(|| bridge_types::AgentError::internal("missing error payload"));
                    Err(ProviderError::from_agent(error))
                };

                if !self.pending.complete(response.id, result) {
                    debug!(
                        request_id = %response.id,
                        "Dropping response for unknown or expired request id"
                    );
                }
            }
            Ok(InboundFrame::Notification(event)) => {
                self.hub.publish(event).await;
            }
            Err(e) => {
                // Not for us. No id to attribute it to, so log and drop.
                debug!(error = %e, "Dropping undecodable inbound frame");
            }
        }
    }
}

/// Handle to the running listener task.
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Abort the listener. Pending requests are failed by the provider's
    /// teardown path, not here.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    /// Whether the listener task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}
