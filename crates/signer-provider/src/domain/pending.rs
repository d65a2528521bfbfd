//! Correlation table: maps in-flight request ids to waiting callers.
//!
//! Flow:
//! 1. The facade calls `register()` and gets a fresh id plus a oneshot
//!    receiver.
//! 2. The facade sends the encoded request over the channel.
//! 3. The channel listener receives the response and calls `complete()`.
//! 4. The facade awaits the receiver under its timeout.
//!
//! Resolution races (response vs timeout vs channel failure) are settled by
//! whoever removes the entry from the map first; every later attempt finds
//! nothing and is a silent no-op. The caller's continuation can therefore
//! never be invoked twice.

use crate::domain::error::ProviderError;
use bridge_types::{OperationKind, RequestId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Resolution delivered to a waiting caller.
#[derive(Debug)]
pub struct AgentResponse {
    /// Id this resolution is for.
    pub id: RequestId,
    /// Success payload or typed failure.
    pub result: Result<serde_json::Value, ProviderError>,
    /// Time between registration and resolution.
    pub response_time: Duration,
}

/// A pending request waiting for resolution.
struct PendingRequest {
    /// Channel to deliver the resolution.
    sender: oneshot::Sender<AgentResponse>,
    /// When the request was registered.
    created_at: Instant,
    /// Operation kind (for logging).
    operation: OperationKind,
    /// Timeout for this request.
    timeout: Duration,
}

/// Statistics for the correlation table.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered.
    pub total_registered: AtomicU64,
    /// Total requests resolved with a response (success or agent error).
    pub total_completed: AtomicU64,
    /// Total requests swept after their timeout expired.
    pub total_timeouts: AtomicU64,
    /// Total requests cancelled (timeout path or dropped callers).
    pub total_cancelled: AtomicU64,
}

/// The correlation table.
pub struct PendingRequestStore {
    /// Map of request id to pending request.
    pending: DashMap<RequestId, PendingRequest>,
    /// Default timeout.
    default_timeout: Duration,
    /// Statistics.
    stats: Arc<PendingStats>,
}

impl PendingRequestStore {
    /// Create a store with the given default timeout.
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            default_timeout,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a request and get a receiver for its resolution.
    pub fn register(
        &self,
        operation: OperationKind,
        timeout: Option<Duration>,
    ) -> (RequestId, oneshot::Receiver<AgentResponse>) {
        let id = RequestId::new();
        let (tx, rx) = oneshot::channel();

        let request = PendingRequest {
            sender: tx,
            created_at: Instant::now(),
            operation,
            timeout: timeout.unwrap_or(self.default_timeout),
        };

        self.pending.insert(id, request);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(request_id = %id, operation = %operation, "Registered pending request");

        (id, rx)
    }

    /// Resolve a pending request.
    ///
    /// Returns true if the request was found and resolved. An unknown id is
    /// a logged no-op: expected under timeout races, never an error.
    pub fn complete(
        &self,
        id: RequestId,
        result: Result<serde_json::Value, ProviderError>,
    ) -> bool {
        let Some((_, pending)) = self.pending.remove(&id) else {
            warn!(request_id = %id, "Response for unknown or expired request id");
            return false;
        };

        let response_time = pending.created_at.elapsed();
        let response = AgentResponse {
            id,
            result,
            response_time,
        };

        match pending.sender.send(response) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %id,
                    operation = %pending.operation,
                    response_time_ms = response_time.as_millis(),
                    "Resolved pending request"
                );
                true
            }
            Err(_) => {
                // Receiver dropped: the caller already gave up
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %id,
                    operation = %pending.operation,
                    "Pending request receiver dropped"
                );
                false
            }
        }
    }

    /// Resolve a pending request with a non-timeout failure (e.g. channel
    /// closed). Same first-writer-wins behavior as [`Self::complete`].
    pub fn fail(&self, id: RequestId, error: ProviderError) -> bool {
        self.complete(id, Err(error))
    }

    /// Fail every outstanding request, draining the table. Used on teardown.
    ///
    /// Returns how many requests were failed.
    pub fn fail_all(&self, error: &ProviderError) -> usize {
        let ids: Vec<RequestId> = self.pending.iter().map(|entry| *entry.key()).collect();
        let mut failed = 0;
        for id in ids {
            if self.fail(id, error.clone()) {
                failed += 1;
            }
        }
        failed
    }

    /// Remove a pending request without resolving it (send failure before the
    /// request ever reached the agent, or an abandoned caller).
    pub fn cancel(&self, id: &RequestId) -> bool {
        if self.pending.remove(id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Remove a pending request whose caller-side timer fired, attributing
    /// the removal to the timeout counter rather than the cancellation one.
    pub fn expire(&self, id: &RequestId) -> bool {
        if self.pending.remove(id).is_some() {
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Sweep requests whose timeout has expired.
    ///
    /// The per-operation timeout already rejects the caller; this sweep only
    /// reclaims entries whose callers disappeared without awaiting.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, request| {
            let elapsed = now.duration_since(request.created_at);
            if elapsed > request.timeout {
                warn!(
                    request_id = %id,
                    operation = %request.operation,
                    elapsed_ms = elapsed.as_millis(),
                    timeout_ms = request.timeout.as_millis(),
                    "Removing expired pending request"
                );
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false // Remove
            } else {
                true // Keep
            }
        });

        removed
    }

    /// Number of currently pending requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a request id is still outstanding.
    #[must_use]
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// Statistics.
    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Background task sweeping abandoned requests on an interval.
pub async fn cleanup_task(store: Arc<PendingRequestStore>, interval: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired pending requests");
        }
    }
}
