//! Configuration errors raised while building retry components.

use std::time::Duration;
use thiserror::Error;

/// An invalid backoff configuration.
///
/// Returned from [`ExponentialBackoffBuilder::build`](crate::retry::ExponentialBackoffBuilder::build)
/// and from configuration loaders; a supplier that was built successfully
/// never fails afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The minimum delay must be strictly positive.
    #[error("minimum delay must be greater than zero")]
    ZeroMinDelay,

    /// The minimum delay is larger than the maximum delay.
    #[error("minimum delay {min:?} exceeds maximum delay {max:?}")]
    MinExceedsMax {
        /// Configured minimum delay
        min: Duration,
        /// Configured maximum delay
        max: Duration,
    },

    /// The growth factor must be finite and greater than 1.0.
    #[error("backoff factor must be finite and greater than 1.0, got {0}")]
    InvalidBackoffFactor(f64),

    /// The jitter factor must be finite and within `[0.0, 1.0)`.
    #[error("jitter factor must be within [0.0, 1.0), got {0}")]
    InvalidJitterFactor(f64),

    /// A configuration source held a value that could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Name of the setting, e.g. an environment variable
        key: String,
        /// The raw value found
        value: String,
    },
}
