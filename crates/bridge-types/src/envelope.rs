//! # Wire Envelope
//!
//! The shapes exchanged with the custody agent over the shared channel.
//!
//! - Outbound request: `{ id, operation, payload }`
//! - Inbound response: `{ id, ok, result | error }`
//!
//! ## Forward Compatibility
//!
//! The agent may be newer than this bridge. Deserializers MUST ignore unknown
//! fields rather than reject them (the serde default), and a malformed frame
//! is a decode error for the listener to drop, never a crash.

use crate::correlation::RequestId;
use crate::errors::AgentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of operations the bridge can request from the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Ask the agent to connect the active account to this site.
    RequestConnection,
    /// Ask the agent to prompt the user to switch the active account.
    RequestSwitchAccount,
    /// Sign a serialized transaction payload.
    Sign,
    /// Sign an arbitrary human-readable message.
    SignMessage,
    /// Disconnect the active account from this site.
    DisconnectFromSite,
    /// Query whether the active account is connected to this site.
    IsConnected,
    /// Query the active account's public key.
    GetActivePublicKey,
    /// Query the agent's version string.
    GetVersion,
}

impl OperationKind {
    /// Stable wire name for this operation.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::RequestConnection => "requestConnection",
            Self::RequestSwitchAccount => "requestSwitchAccount",
            Self::Sign => "sign",
            Self::SignMessage => "signMessage",
            Self::DisconnectFromSite => "disconnectFromSite",
            Self::IsConnected => "isConnected",
            Self::GetActivePublicKey => "getActivePublicKey",
            Self::GetVersion => "getVersion",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Payload of a [`OperationKind::Sign`] request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPayload {
    /// Serialized transaction, opaque to the bridge.
    pub deploy: String,
    /// Hex-encoded public key the signature is requested for.
    pub signing_public_key_hex: String,
}

/// Payload of a [`OperationKind::SignMessage`] request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessagePayload {
    /// The message to sign, opaque to the bridge.
    pub message: String,
    /// Hex-encoded public key the signature is requested for.
    pub signing_public_key_hex: String,
}

/// Operation-specific request payload.
///
/// Only the two signing operations carry data; every other operation sends
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestPayload {
    /// Payload for `sign`.
    Sign(SignPayload),
    /// Payload for `signMessage`.
    SignMessage(SignMessagePayload),
    /// No payload (serializes as `null`).
    Empty,
}

/// One outbound request frame.
///
/// Ownership transfers to the correlation table at registration; the request
/// is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerRequest {
    /// Unique id for correlating the response.
    pub id: RequestId,
    /// Which operation is being requested.
    pub operation: OperationKind,
    /// Operation-specific payload.
    pub payload: RequestPayload,
}

impl SignerRequest {
    /// Create a request with a freshly generated id.
    #[must_use]
    pub fn new(operation: OperationKind, payload: RequestPayload) -> Self {
        Self {
            id: RequestId::new(),
            operation,
            payload,
        }
    }

    /// Create a request with a pre-allocated id (the id is normally issued by
    /// the correlation table before the frame is built).
    #[must_use]
    pub fn with_id(id: RequestId, operation: OperationKind, payload: RequestPayload) -> Self {
        Self {
            id,
            operation,
            payload,
        }
    }
}

/// One inbound response frame.
///
/// A response whose `id` matches no outstanding request is inert and dropped;
/// that is expected under timeout races, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerResponse {
    /// Id of the request this response answers.
    pub id: RequestId,
    /// True for success, false for an agent-reported failure.
    pub ok: bool,
    /// Operation-specific success payload (bool, string, or signature object).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure payload when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AgentError>,
}

impl SignerResponse {
    /// Build a success response.
    #[must_use]
    pub fn success(id: RequestId, result: serde_json::Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Build a failure response.
    #[must_use]
    pub fn failure(id: RequestId, error: AgentError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}
