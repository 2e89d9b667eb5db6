//! Failure classification for the retry loop.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Context of a single attempt inside a [`RetryLoop`](super::RetryLoop).
///
/// Handed to the operation when the attempt starts and to the
/// [`FailureDecision`] when it fails.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    attempt: u32,
    previous_delay: Duration,
    token: CancellationToken,
}

impl AttemptContext {
    /// Create a context for the given attempt.
    pub fn new(attempt: u32, previous_delay: Duration, token: CancellationToken) -> Self {
        Self {
            attempt,
            previous_delay,
            token,
        }
    }

    /// The attempt number, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The backoff delay waited before this attempt, zero for the first one.
    pub fn previous_delay(&self) -> Duration {
        self.previous_delay
    }

    /// Token cancelled when the surrounding loop is cancelled.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Decides whether a failed attempt is fatal.
///
/// Returning `true` stops the loop and surfaces the error to the caller
/// unchanged. Returning `false` marks the failure as transient: the loop backs
/// off and tries again. The loop never inspects errors itself, so callers keep
/// their own error taxonomy.
///
/// Any `Fn(&AttemptContext, &E) -> bool` closure is a decision.
///
/// # Examples
///
/// ```rust
/// use zeebe_core::retry::{AttemptContext, FailureDecision};
/// use std::io;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// /// Only connection resets are worth retrying.
/// struct ResetsOnly;
///
/// impl FailureDecision<io::Error> for ResetsOnly {
///     fn should_stop(&self, _ctx: &AttemptContext, error: &io::Error) -> bool {
///         error.kind() != io::ErrorKind::ConnectionReset
///     }
/// }
///
/// let ctx = AttemptContext::new(1, Duration::ZERO, CancellationToken::new());
/// let reset = io::Error::from(io::ErrorKind::ConnectionReset);
/// assert!(!ResetsOnly.should_stop(&ctx, &reset));
///
/// let closure = |ctx: &AttemptContext, _: &io::Error| ctx.attempt() >= 3;
/// assert!(!closure.should_stop(&ctx, &reset));
/// ```
pub trait FailureDecision<E: ?Sized>: Send + Sync {
    /// Returns `true` if `error` is fatal and retrying must stop.
    fn should_stop(&self, ctx: &AttemptContext, error: &E) -> bool;
}

impl<E, F> FailureDecision<E> for F
where
    E: ?Sized,
    F: Fn(&AttemptContext, &E) -> bool + Send + Sync,
{
    fn should_stop(&self, ctx: &AttemptContext, error: &E) -> bool {
        self(ctx, error)
    }
}
