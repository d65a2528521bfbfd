//! Provider facade: the public operation set.
//!
//! Every operation follows the same sequence: validate inputs, fail fast if
//! the agent is not attached, register in the correlation table, encode and
//! send, await the resolution under the configured timeout, then parse the
//! JSON result into the operation's return type. Exactly one outcome per
//! call: success, typed cancellation (signing only), or error.

use crate::channel::AgentChannel;
use crate::codec::encode_request;
use crate::domain::config::{ConfigError, ProviderConfig};
use crate::domain::error::ProviderError;
use crate::domain::pending::{cleanup_task, PendingRequestStore, PendingStats};
use crate::listener::{ChannelListener, ListenerHandle};
use bridge_bus::{EventFilter, InMemoryEventHub, Subscription};
use bridge_types::{
    OperationKind, RequestPayload, SignMessagePayload, SignPayload, SignatureResult,
    SignerRequest,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// The bridge to the custody agent.
///
/// Holds the correlation table, the notification hub, and the single channel
/// listener as its only mutable state; construct once per page and share.
pub struct SignerProvider {
    config: ProviderConfig,
    channel: Arc<dyn AgentChannel>,
    pending: Arc<PendingRequestStore>,
    hub: Arc<InMemoryEventHub>,
    listener: ListenerHandle,
    cleanup: JoinHandle<()>,
}

impl SignerProvider {
    /// Construct the provider and spawn its channel listener.
    ///
    /// `inbound` is the stream of raw frames from the shared channel; the
    /// provider takes sole ownership of it.
    pub fn new(
        config: ProviderConfig,
        channel: Arc<dyn AgentChannel>,
        inbound: mpsc::Receiver<serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let pending = Arc::new(PendingRequestStore::new(config.request_timeout()));
        let hub = Arc::new(InMemoryEventHub::with_capacity(config.channel_capacity));
        let listener = ChannelListener::new(pending.clone(), hub.clone(), inbound).spawn();
        let cleanup = tokio::spawn(cleanup_task(pending.clone(), config.cleanup_interval()));

        Ok(Self {
            config,
            channel,
            pending,
            hub,
            listener,
            cleanup,
        })
    }

    /// Subscribe to agent state notifications.
    ///
    /// Site-scoped kinds (connected/disconnected/tabChanged) require the
    /// filter to carry the subscriber's origin; locked/unlocked/
    /// activeKeyChanged are broadcast to every subscriber.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.hub.subscribe(filter)
    }

    /// The notification hub, for hosts that want stream access.
    #[must_use]
    pub fn hub(&self) -> &Arc<InMemoryEventHub> {
        &self.hub
    }

    /// Number of requests currently awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    /// Correlation-table statistics.
    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        self.pending.stats()
    }

    /// Ask the agent to connect the active account to this site.
    ///
    /// Resolves `true` when the user accepts or the site is already
    /// connected. The agent emits a `signer:connected` notification on
    /// success.
    pub async fn request_connection(&self) -> Result<bool, ProviderError> {
        let result = self
            .request(OperationKind::RequestConnection, RequestPayload::Empty)
            .await?;
        parse_bool(&result)
    }

    /// Ask the agent to prompt for an account switch.
    pub async fn request_switch_account(&self) -> Result<bool, ProviderError> {
        let result = self
            .request(OperationKind::RequestSwitchAccount, RequestPayload::Empty)
            .await?;
        parse_bool(&result)
    }

    /// Request a signature over a serialized transaction payload.
    ///
    /// User refusal is not an error: it resolves to
    /// [`SignatureResult::Cancelled`].
    pub async fn sign(
        &self,
        deploy: &str,
        signing_public_key_hex: &str,
    ) -> Result<SignatureResult, ProviderError> {
        validate_non_empty(deploy, "deploy")?;
        validate_public_key_hex(signing_public_key_hex)?;

        let payload = RequestPayload::Sign(SignPayload {
            deploy: deploy.to_string(),
            signing_public_key_hex: signing_public_key_hex.to_string(),
        });
        let result = self.request(OperationKind::Sign, payload).await?;
        parse_signature(result)
    }

    /// Request a signature over an arbitrary message.
    ///
    /// Same cancellation contract as [`Self::sign`].
    pub async fn sign_message(
        &self,
        message: &str,
        signing_public_key_hex: &str,
    ) -> Result<SignatureResult, ProviderError> {
        validate_non_empty(message, "message")?;
        validate_public_key_hex(signing_public_key_hex)?;

        let payload = RequestPayload::SignMessage(SignMessagePayload {
            message: message.to_string(),
            signing_public_key_hex: signing_public_key_hex.to_string(),
        });
        let result = self.request(OperationKind::SignMessage, payload).await?;
        parse_signature(result)
    }

    /// Disconnect the active account from this site. The agent emits a
    /// `signer:disconnected` notification on success.
    pub async fn disconnect_from_site(&self) -> Result<bool, ProviderError> {
        let result = self
            .request(OperationKind::DisconnectFromSite, RequestPayload::Empty)
            .await?;
        parse_bool(&result)
    }

    /// Whether the active account is connected to this site.
    ///
    /// Errors with [`ProviderError::Locked`] while the wallet is locked
    /// (error-typed contract; this never resolves to a falsy placeholder).
    pub async fn is_connected(&self) -> Result<bool, ProviderError> {
        let result = self
            .request(OperationKind::IsConnected, RequestPayload::Empty)
            .await?;
        parse_bool(&result)
    }

    /// Hex-encoded public key of the active account.
    ///
    /// Errors with [`ProviderError::Locked`] or
    /// [`ProviderError::NotApproved`] on the respective agent states.
    pub async fn get_active_public_key(&self) -> Result<String, ProviderError> {
        let result = self
            .request(OperationKind::GetActivePublicKey, RequestPayload::Empty)
            .await?;
        parse_string(&result)
    }

    /// The agent's version string.
    pub async fn get_version(&self) -> Result<String, ProviderError> {
        let result = self
            .request(OperationKind::GetVersion, RequestPayload::Empty)
            .await?;
        parse_string(&result)
    }

    /// Tear the bridge down: stop the listener and fail every outstanding
    /// request. Only needed when the host disposes the bridge explicitly.
    pub fn shutdown(&self) {
        self.listener.shutdown();
        self.cleanup.abort();
        self.pending.fail_all(&ProviderError::ChannelClosed);
    }

    /// Send one request and await its resolution.
    async fn request(
        &self,
        operation: OperationKind,
        payload: RequestPayload,
    ) -> Result<serde_json::Value, ProviderError> {
        if !self.channel.is_attached() {
            return Err(ProviderError::AgentUnavailable);
        }

        let timeout = self.config.request_timeout();
        let deadline = tokio::time::Instant::now() + timeout;
        let (id, rx) = self.pending.register(operation, Some(timeout));

        let request = SignerRequest::with_id(id, operation, payload);
        let frame = encode_request(&request);

        // The send itself can stall when the agent stops draining the
        // channel, so it spends from the same budget as the response wait.
        match tokio::time::timeout_at(deadline, self.channel.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                // Never reached the agent; unregister before reporting
                self.pending.cancel(&id);
                return Err(ProviderError::ChannelClosed);
            }
            Err(_) => {
                self.pending.expire(&id);
                return Err(ProviderError::Timeout {
                    elapsed_ms: timeout.as_millis() as u64,
                });
            }
        }

        debug!(request_id = %id, operation = %operation, "Sent request to agent");

        match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(response)) => response.result,
            Ok(Err(_)) => {
                // Store was drained (teardown) before resolution
                Err(ProviderError::ChannelClosed)
            }
            Err(_) => {
                // Timer fired first; a response racing this loses the removal
                // and is dropped by the listener.
                self.pending.expire(&id);
                Err(ProviderError::Timeout {
                    elapsed_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

impl Drop for SignerProvider {
    fn drop(&mut self) {
        self.listener.shutdown();
        self.cleanup.abort();
    }
}

fn validate_non_empty(value: &str, field: &str) -> Result<(), ProviderError> {
    if value.is_empty() {
        return Err(ProviderError::InvalidParams(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

fn validate_public_key_hex(key: &str) -> Result<(), ProviderError> {
    if key.is_empty() {
        return Err(ProviderError::InvalidParams(
            "signing public key must not be empty".into(),
        ));
    }
    hex::decode(key).map_err(|e| {
        ProviderError::InvalidParams(format!("signing public key is not valid hex: {e}"))
    })?;
    Ok(())
}

fn parse_bool(value: &serde_json::Value) -> Result<bool, ProviderError> {
    value
        .as_bool()
        .ok_or_else(|| ProviderError::UnexpectedResult(format!("expected boolean, got {value}")))
}

fn parse_string(value: &serde_json::Value) -> Result<String, ProviderError> {
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| ProviderError::UnexpectedResult(format!("expected string, got {value}")))
}

fn parse_signature(value: serde_json::Value) -> Result<SignatureResult, ProviderError> {
    serde_json::from_value(value).map_err(|e| ProviderError::UnexpectedResult(e.to_string()))
}
