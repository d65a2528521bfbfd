//! # Bridge Types - Shared Wire and Entity Types
//!
//! Contains the wire envelope (request/response shapes sent over the shared
//! channel), the fixed operation set, and the wallet entities mirrored from
//! the custody agent. Every other crate in the workspace depends on this one;
//! nothing here performs I/O.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod correlation;
pub mod entities;
pub mod envelope;
pub mod errors;

// Re-export main types
pub use correlation::RequestId;
pub use entities::{EntityError, SignatureResult, WalletState};
pub use envelope::{
    OperationKind, RequestPayload, SignMessagePayload, SignPayload, SignerRequest, SignerResponse,
};
pub use errors::{codes, AgentError};
