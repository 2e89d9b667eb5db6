//! Retry backoff and the retry loop that consumes it.
//!
//! # Key Types
//!
//! - [`BackoffSupplier`] - computes the next delay from the previous one
//! - [`ExponentialBackoff`] - exponential growth between a floor and a cap, with jitter
//! - [`FailureDecision`] - decides whether an error is fatal
//! - [`RetryLoop`] - runs an operation until it succeeds, fails fatally, or is cancelled
//!
//! # Examples
//!
//! ```rust
//! use zeebe_core::retry::{BackoffSupplier, ExponentialBackoff};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), zeebe_core::ConfigError> {
//! let backoff = ExponentialBackoff::builder()
//!     .min_delay(Duration::from_millis(50))
//!     .max_delay(Duration::from_secs(5))
//!     .backoff_factor(1.6)
//!     .jitter_factor(0.0)
//!     .build()?;
//!
//! let first = backoff.supply_retry_delay(Duration::ZERO);
//! assert_eq!(first, Duration::from_millis(50));
//! assert!(backoff.supply_retry_delay(first) > first);
//! # Ok(())
//! # }
//! ```

mod decision;
mod exponential;
mod retry_loop;
mod supplier;

pub use decision::{AttemptContext, FailureDecision};
pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use retry_loop::{RetryError, RetryLoop};
pub use supplier::BackoffSupplier;
