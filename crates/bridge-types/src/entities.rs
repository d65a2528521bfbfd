//! Wallet entities mirrored from the custody agent.
//!
//! [`WalletState`] is agent-owned, read-only state: only the most recent
//! notification value is valid, and the page must never assume it is
//! authoritative between notifications. [`SignatureResult`] is the
//! success-path result of the two signing operations, with user cancellation
//! as a first-class variant rather than an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invariant violations detected while decoding entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// A cancelled signature result carried signature fields.
    #[error("cancelled signature result must not carry signature fields")]
    CancelledWithSignature,

    /// An approved signature result was missing one of its fields.
    #[error("approved signature result must carry both hex and byte forms")]
    MissingSignature,

    /// Hex and byte forms of a signature did not encode the same bytes.
    #[error("signature hex does not match signature bytes")]
    SignatureMismatch,

    /// The hex form was not valid hex.
    #[error("invalid signature hex: {0}")]
    InvalidHex(String),
}

/// Snapshot of agent state broadcast in notifications.
///
/// `is_connected` is meaningful only when the wallet is unlocked, and
/// `active_key` only when unlocked and connected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    /// Whether the wallet is locked.
    pub is_locked: bool,
    /// Whether the active account is connected to this site.
    pub is_connected: bool,
    /// Hex-encoded public key of the active account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_key: Option<String>,
}

impl WalletState {
    /// Encode as the JSON string carried in a notification `detail` field.
    #[must_use]
    pub fn to_detail_json(&self) -> String {
        // Serialization of this plain struct cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode from a notification `detail` string.
    pub fn from_detail_json(detail: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(detail)
    }
}

/// Wire shape of a signature result: a `cancelled` flag with optional
/// signature fields. Decoding validates the invariants before constructing
/// [`SignatureResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureWire {
    cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature_hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<Vec<u8>>,
}

/// Outcome of a signing operation.
///
/// Exactly one of the two variants; cancellation is a success-path value
/// distinguishing "user explicitly declined" from failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignatureWire", into = "SignatureWire")]
pub enum SignatureResult {
    /// The user declined to sign.
    Cancelled,
    /// The user approved; both forms encode the same bytes.
    Approved {
        /// Hex encoding of the signature.
        signature_hex: String,
        /// Raw signature bytes.
        signature: Vec<u8>,
    },
}

impl SignatureResult {
    /// Build an approved result from raw signature bytes.
    #[must_use]
    pub fn approved(signature: Vec<u8>) -> Self {
        Self::Approved {
            signature_hex: hex::encode(&signature),
            signature,
        }
    }

    /// True if the user declined to sign.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl TryFrom<SignatureWire> for SignatureResult {
    type Error = EntityError;

    fn try_from(wire: SignatureWire) -> Result<Self, Self::Error> {
        if wire.cancelled {
            if wire.signature_hex.is_some() || wire.signature.is_some() {
                return Err(EntityError::CancelledWithSignature);
            }
            return Ok(Self::Cancelled);
        }

        let (Some(signature_hex), Some(signature)) = (wire.signature_hex, wire.signature) else {
            return Err(EntityError::MissingSignature);
        };
        let decoded = hex::decode(&signature_hex)
            .map_err(|e| EntityError::InvalidHex(e.to_string()))?;
        if decoded != signature {
            return Err(EntityError::SignatureMismatch);
        }
        Ok(Self::Approved {
            signature_hex,
            signature,
        })
    }
}

impl From<SignatureResult> for SignatureWire {
    fn from(result: SignatureResult) -> Self {
        match result {
            SignatureResult::Cancelled => Self {
                cancelled: true,
                signature_hex: None,
                signature: None,
            },
            SignatureResult::Approved {
                signature_hex,
                signature,
            } => Self {
                cancelled: false,
                signature_hex: Some(signature_hex),
                signature: Some(signature),
            },
        }
    }
}
