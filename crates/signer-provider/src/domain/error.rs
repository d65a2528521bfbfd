//! Provider error taxonomy.
//!
//! User cancellation is NOT represented here: it is a success-path value of
//! the two signing operations (`SignatureResult::Cancelled`). Nothing in this
//! module is retried automatically; retry is the caller's responsibility.

use bridge_types::{codes, AgentError};
use thiserror::Error;

/// Errors surfaced by provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The agent's provider object has not attached to the page. Fails fast,
    /// never via timeout.
    #[error("custody agent is not attached")]
    AgentUnavailable,

    /// No response arrived within the configured duration. The agent may be
    /// unreachable, slow, or the user never acted. Terminal for this
    /// request's id; a fresh call gets a fresh id and window.
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the bridge waited.
        elapsed_ms: u64,
    },

    /// Agent-reported: the wallet is locked (code 1).
    #[error("wallet is locked")]
    Locked,

    /// Agent-reported: the active account is not approved for this site
    /// (code 2).
    #[error("active account is not approved for this site")]
    NotApproved,

    /// Any other agent-reported failure, with its stable code.
    #[error("agent error {code}: {message}")]
    Agent {
        /// Stable numeric code.
        code: i32,
        /// Human-readable description.
        message: String,
    },

    /// The channel to the agent closed with the request outstanding.
    #[error("channel to custody agent closed")]
    ChannelClosed,

    /// Caller-supplied input was rejected before anything was sent.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The agent answered `ok` but the result did not have the shape this
    /// operation expects.
    #[error("unexpected result shape: {0}")]
    UnexpectedResult(String),
}

impl ProviderError {
    /// Stable numeric code for agent-reported variants, `None` for
    /// bridge-local failures.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Locked => Some(codes::LOCKED),
            Self::NotApproved => Some(codes::NOT_APPROVED),
            Self::Agent { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Map a wire-level agent error onto the taxonomy, branching on the
    /// stable code.
    #[must_use]
    pub fn from_agent(error: AgentError) -> Self {
        match error.code {
            codes::LOCKED => Self::Locked,
            codes::NOT_APPROVED => Self::NotApproved,
            code => Self::Agent {
                code,
                message: error.message,
            },
        }
    }
}
