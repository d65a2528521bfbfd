//! Envelope codec: encodes outbound requests and decodes inbound frames.
//!
//! Inbound frames are discriminated structurally: a response carries `id` and
//! `ok`, a notification carries `kind` and `detail`. Unknown fields are
//! ignored so an agent newer than this bridge keeps working; a frame that
//! fits neither shape is a [`CodecError`] for the listener to drop, never a
//! crash.

use bridge_bus::{EventKind, WalletEvent};
use bridge_types::{SignerRequest, SignerResponse};
use serde::Deserialize;
use thiserror::Error;

/// Decode failures. None of these ever reach a specific caller: there is no
/// id to attribute them to, so the listener logs and drops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The frame fit neither the response nor the notification shape.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// The notification kind string is outside the fixed namespace.
    #[error("unrecognized event kind: {0}")]
    UnknownKind(String),
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A response to an outstanding request.
    Response(SignerResponse),
    /// An agent-originated state notification.
    Notification(WalletEvent),
}

/// Wire shape of an inbound notification before its kind is validated.
#[derive(Debug, Deserialize)]
struct WireNotification {
    kind: String,
    #[serde(default)]
    origin: Option<String>,
    detail: String,
}

/// Encode a request for the shared channel.
///
/// Serialization of the derived envelope types cannot fail; an empty object
/// is the defensive fallback, matching how the agent treats absent payloads.
#[must_use]
pub fn encode_request(request: &SignerRequest) -> serde_json::Value {
    serde_json::to_value(request)
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()))
}

/// Decode one inbound frame.
pub fn decode_frame(frame: &serde_json::Value) -> Result<InboundFrame, CodecError> {
    let Some(object) = frame.as_object() else {
        return Err(CodecError::Malformed("frame is not an object".into()));
    };

    // Responses carry `id` + `ok`; notifications carry `kind` + `detail`.
    if object.contains_key("id") && object.contains_key("ok") {
        let response: SignerResponse = serde_json::from_value(frame.clone())
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        return Ok(InboundFrame::Response(response));
    }

    if object.contains_key("kind") {
        let wire: WireNotification = serde_json::from_value(frame.clone())
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        let kind = EventKind::parse(&wire.kind).ok_or(CodecError::UnknownKind(wire.kind))?;
        return Ok(InboundFrame::Notification(WalletEvent {
            kind,
            origin: wire.origin,
            detail: wire.detail,
        }));
    }

    Err(CodecError::Malformed(
        "frame has neither response nor notification shape".into(),
    ))
}
