//! Agent-reported error codes and the wire error shape.
//!
//! The agent reports failures as `{ code, message }`. Codes are a stable,
//! versioned namespace: callers branch on the numeric code, never on the
//! message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable numeric codes reported by the custody agent.
pub mod codes {
    /// The wallet is locked; the user must unlock before any operation.
    pub const LOCKED: i32 = 1;

    /// The active account is not approved for the requesting site.
    pub const NOT_APPROVED: i32 = 2;

    /// Unclassified agent-side failure.
    pub const INTERNAL: i32 = 3;
}

/// Error payload of a failed response, as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("agent error {code}: {message}")]
pub struct AgentError {
    /// Stable numeric code (see [`codes`]).
    pub code: i32,
    /// Human-readable description. Informational only.
    pub message: String,
}

impl AgentError {
    /// Create a new agent error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The wallet-is-locked error.
    #[must_use]
    pub fn locked() -> Self {
        Self::new(codes::LOCKED, "wallet is locked")
    }

    /// The account-not-approved error.
    #[must_use]
    pub fn not_approved() -> Self {
        Self::new(codes::NOT_APPROVED, "active account not approved for this site")
    }

    /// Unclassified internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    /// True if this error carries the locked code.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.code == codes::LOCKED
    }

    /// True if this error carries the not-approved code.
    #[must_use]
    pub fn is_not_approved(&self) -> bool {
        self.code == codes::NOT_APPROVED
    }
}
