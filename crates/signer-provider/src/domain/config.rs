//! Provider configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// The notification buffer default is owned by the hub crate.
pub use bridge_bus::DEFAULT_CHANNEL_CAPACITY;

/// Default request timeout: 30 minutes. Signing waits on a human decision,
/// so the window is deliberately long.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Default interval for sweeping abandoned pending requests.
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 60_000;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The request timeout must be non-zero.
    #[error("request_timeout_ms cannot be 0")]
    ZeroTimeout,

    /// The notification buffer must hold at least one event.
    #[error("channel_capacity cannot be 0")]
    ZeroCapacity,

    /// The cleanup sweep interval must be non-zero.
    #[error("cleanup_interval_ms cannot be 0")]
    ZeroCleanupInterval,
}

/// Provider configuration.
///
/// The single option the instantiating page is expected to set is
/// `request_timeout_ms`, applied uniformly to every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Per-subscriber notification buffer capacity.
    pub channel_capacity: usize,
    /// Interval between sweeps of abandoned pending requests, milliseconds.
    pub cleanup_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
        }
    }
}

impl ProviderConfig {
    /// Configuration with a custom request timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            request_timeout_ms: timeout.as_millis() as u64,
            ..Self::default()
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.cleanup_interval_ms == 0 {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Cleanup sweep interval as a [`Duration`].
    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}
