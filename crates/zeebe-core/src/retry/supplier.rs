//! The backoff supplier seam.

use std::sync::Arc;
use std::time::Duration;

/// Computes how long to wait before the next retry.
///
/// A supplier is a pure function of its configuration and the delay that was
/// used last. It keeps no state between calls, so one instance can be shared
/// by any number of retry loops running concurrently. The caller owns the
/// "previous delay" and feeds every result back in on the next failure.
///
/// # Examples
///
/// ```rust
/// use zeebe_core::retry::BackoffSupplier;
/// use std::time::Duration;
///
/// /// Always waits one second.
/// struct Fixed;
///
/// impl BackoffSupplier for Fixed {
///     fn supply_retry_delay(&self, _previous: Duration) -> Duration {
///         Duration::from_secs(1)
///     }
/// }
///
/// assert_eq!(Fixed.supply_retry_delay(Duration::ZERO), Duration::from_secs(1));
/// ```
pub trait BackoffSupplier: Send + Sync {
    /// Returns the delay to wait before the next attempt.
    ///
    /// `previous` is the delay returned by the last call, or
    /// [`Duration::ZERO`] on the first failure.
    fn supply_retry_delay(&self, previous: Duration) -> Duration;
}

impl<S: BackoffSupplier + ?Sized> BackoffSupplier for Arc<S> {
    fn supply_retry_delay(&self, previous: Duration) -> Duration {
        (**self).supply_retry_delay(previous)
    }
}

impl<S: BackoffSupplier + ?Sized> BackoffSupplier for &S {
    fn supply_retry_delay(&self, previous: Duration) -> Duration {
        (**self).supply_retry_delay(previous)
    }
}
