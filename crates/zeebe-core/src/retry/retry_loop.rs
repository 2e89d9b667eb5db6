//! The worker retry loop.
//!
//! ```text
//! Idle ──► Attempting ──► Success                      (Ok returned)
//!              │
//!              ▼
//!           Failed ──► should_stop? ── yes ──► Stopped (Fatal returned)
//!              │
//!              no
//!              ▼
//!           Backoff ──► sleep(supply_retry_delay(previous)) ──► Attempting
//!
//! token cancelled before an attempt, during it, or while backing off ──► Cancelled
//! ```

use super::decision::{AttemptContext, FailureDecision};
use super::supplier::BackoffSupplier;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a [`RetryLoop`] gave up.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The failure decision classified the error as fatal.
    #[error("non-retryable failure: {0}")]
    Fatal(#[source] E),

    /// The attempt limit was reached while failures were still transient.
    #[error("still failing after {attempts} attempts: {source}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// The last transient error
        #[source]
        source: E,
    },

    /// The loop was cancelled before it could finish.
    #[error("retry loop cancelled")]
    Cancelled,
}

impl<E> RetryError<E> {
    /// Whether the loop stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The operation error, if the loop stopped because of one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Fatal(err) | Self::Exhausted { source: err, .. } => Some(err),
            Self::Cancelled => None,
        }
    }
}

/// Retries a failing operation, pacing attempts with a [`BackoffSupplier`].
///
/// The loop is policy-free: whether an error is worth another attempt is up
/// to the [`FailureDecision`], and how long to wait is up to the supplier.
/// The only state it keeps is the previous delay, private to each
/// [`run`](Self::run) call, so one `RetryLoop` can drive many concurrent
/// runs. Cloning is cheap.
///
/// # Examples
///
/// ```rust
/// use zeebe_core::prelude::*;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let retry = RetryLoop::new(ExponentialBackoff::default(), |_: &AttemptContext, err: &std::io::Error| {
///     err.kind() == std::io::ErrorKind::PermissionDenied
/// });
///
/// let calls = Arc::new(AtomicU32::new(0));
/// let token = CancellationToken::new();
/// let value = retry
///     .run(&token, |_ctx| {
///         let calls = Arc::clone(&calls);
///         async move {
///             if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err(std::io::Error::other("gateway unavailable"))
///             } else {
///                 Ok("activated")
///             }
///         }
///     })
///     .await?;
/// assert_eq!(value, "activated");
/// # Ok(())
/// # }
/// ```
pub struct RetryLoop<B: ?Sized, D: ?Sized> {
    backoff: Arc<B>,
    decision: Arc<D>,
    max_attempts: Option<u32>,
}

impl<B, D> RetryLoop<B, D> {
    /// Create a loop from a supplier and a failure decision.
    pub fn new(backoff: B, decision: D) -> Self {
        Self::from_shared(Arc::new(backoff), Arc::new(decision))
    }
}

impl<B: ?Sized, D: ?Sized> RetryLoop<B, D> {
    /// Create a loop from components that are shared with other loops.
    pub fn from_shared(backoff: Arc<B>, decision: Arc<D>) -> Self {
        Self {
            backoff,
            decision,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` attempts even if failures stay transient.
    ///
    /// Unlimited by default; job pollers keep trying until they are closed.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// The supplier pacing this loop.
    pub fn backoff(&self) -> &Arc<B> {
        &self.backoff
    }

    /// The decision classifying failures.
    pub fn decision(&self) -> &Arc<D> {
        &self.decision
    }

    /// The attempt limit, if any.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, fails fatally, or `token` is cancelled.
    ///
    /// Every attempt gets a fresh [`AttemptContext`] whose token is a child of
    /// `token`. Cancellation is observed before each attempt, while the
    /// attempt is in flight, and during the backoff wait; in all three cases
    /// the loop returns [`RetryError::Cancelled`] at once.
    ///
    /// # Errors
    ///
    /// - [`RetryError::Fatal`] with the operation's error when the decision says stop
    /// - [`RetryError::Exhausted`] when the attempt limit is reached
    /// - [`RetryError::Cancelled`] when `token` is cancelled
    pub async fn run<F, Fut, T, E>(
        &self,
        token: &CancellationToken,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        B: BackoffSupplier,
        D: FailureDecision<E>,
        F: FnMut(AttemptContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut previous = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            attempt = attempt.saturating_add(1);
            let ctx = AttemptContext::new(attempt, previous, token.child_token());

            #[cfg(feature = "tracing")]
            tracing::trace!(attempt, previous_delay_ms = previous.as_millis() as u64, "Starting attempt");

            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(RetryError::Cancelled),
                outcome = operation(ctx.clone()) => outcome,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if self.decision.should_stop(&ctx, &error) {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, error = %error, "Failure classified as fatal");
                return Err(RetryError::Fatal(error));
            }

            if let Some(max_attempts) = self.max_attempts
                && attempt >= max_attempts
            {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = self.backoff.supply_retry_delay(previous);
            previous = delay;

            #[cfg(feature = "tracing")]
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient failure, backing off"
            );

            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

impl<B: ?Sized, D: ?Sized> Clone for RetryLoop<B, D> {
    fn clone(&self) -> Self {
        Self {
            backoff: Arc::clone(&self.backoff),
            decision: Arc::clone(&self.decision),
            max_attempts: self.max_attempts,
        }
    }
}

impl<B: ?Sized, D: ?Sized> fmt::Debug for RetryLoop<B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLoop")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
