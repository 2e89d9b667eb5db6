#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core retry abstractions for the Zeebe client crates.
//!
//! Job workers poll the gateway for work forever and must ride out gateway
//! restarts, overload and network blips. This crate holds the pieces that
//! decide how they do that:
//!
//! - **Backoff supplier** via the [`BackoffSupplier`](retry::BackoffSupplier) trait
//!   - [`ExponentialBackoff`](retry::ExponentialBackoff): previous-delay feedback with jitter
//!   - validated construction through [`ExponentialBackoffBuilder`](retry::ExponentialBackoffBuilder)
//! - **Failure classification** via the [`FailureDecision`](retry::FailureDecision) capability
//! - **Retry loop** via [`RetryLoop`](retry::RetryLoop), cancellable at every wait
//!
//! # Examples
//!
//! ```rust
//! use zeebe_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoff = ExponentialBackoff::builder()
//!     .min_delay(Duration::from_millis(50))
//!     .max_delay(Duration::from_secs(5))
//!     .build()?;
//!
//! let retry = RetryLoop::new(backoff, |_: &AttemptContext, _: &std::io::Error| false);
//! let token = CancellationToken::new();
//!
//! let value = retry
//!     .run(&token, |_ctx| async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod retry;

pub use error::ConfigError;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use zeebe_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::retry::{
        AttemptContext, BackoffSupplier, ExponentialBackoff, ExponentialBackoffBuilder,
        FailureDecision, RetryError, RetryLoop,
    };
    pub use tokio_util::sync::CancellationToken;
}
