//! Retry classification for gateway errors
//!
//! This module connects transport errors to the universal retry abstraction
//! from `zeebe-core`.

use crate::error::{Code, TransportError};
use zeebe_core::retry::{AttemptContext, FailureDecision};

/// Failure decision used by the client when the caller supplies none.
///
/// # Gateway Retry Logic
///
/// Transient (retried with backoff):
/// - `UNAVAILABLE` and connection errors (gateway restarting, network blip)
/// - `RESOURCE_EXHAUSTED` (broker backpressure)
/// - `DEADLINE_EXCEEDED` and per-attempt timeouts
///
/// Everything else is fatal: a malformed request or a missing permission
/// will fail the same way on every attempt.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use zeebe_core::retry::{AttemptContext, FailureDecision};
/// use zeebe_core::prelude::CancellationToken;
/// use zeebe_transport::{Code, DefaultFailureDecision, TransportError};
///
/// let ctx = AttemptContext::new(1, Duration::ZERO, CancellationToken::new());
/// let decision = DefaultFailureDecision;
///
/// assert!(!decision.should_stop(&ctx, &TransportError::status(Code::Unavailable, "restarting")));
/// assert!(decision.should_stop(&ctx, &TransportError::status(Code::InvalidArgument, "bad type")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFailureDecision;

impl DefaultFailureDecision {
    /// Check if a transport error should be retried.
    ///
    /// # Parameters
    ///
    /// - `error`: The transport error to evaluate
    ///
    /// # Returns
    ///
    /// `true` if the error is transient, `false` if it is fatal
    pub fn is_retryable(error: &TransportError) -> bool {
        matches!(
            error.code(),
            Code::Unavailable | Code::ResourceExhausted | Code::DeadlineExceeded
        )
    }
}

impl FailureDecision<TransportError> for DefaultFailureDecision {
    fn should_stop(&self, ctx: &AttemptContext, error: &TransportError) -> bool {
        let fatal = !Self::is_retryable(error);
        if fatal {
            tracing::debug!(attempt = ctx.attempt(), code = %error.code(), "Gateway error is not retryable");
        }
        fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;
    use zeebe_core::prelude::CancellationToken;

    fn ctx() -> AttemptContext {
        AttemptContext::new(1, Duration::ZERO, CancellationToken::new())
    }

    #[rstest]
    #[case(TransportError::status(Code::Unavailable, "gateway down"))]
    #[case(TransportError::status(Code::ResourceExhausted, "backpressure"))]
    #[case(TransportError::status(Code::DeadlineExceeded, "slow broker"))]
    #[case(TransportError::Connection("connection reset".to_string()))]
    #[case(TransportError::DeadlineExceeded(Duration::from_secs(20)))]
    fn test_transient_errors_continue(#[case] error: TransportError) {
        assert!(DefaultFailureDecision::is_retryable(&error));
        assert!(!DefaultFailureDecision.should_stop(&ctx(), &error));
    }

    #[rstest]
    #[case(TransportError::status(Code::InvalidArgument, "job type empty"))]
    #[case(TransportError::status(Code::NotFound, "no such job"))]
    #[case(TransportError::status(Code::PermissionDenied, "forbidden"))]
    #[case(TransportError::status(Code::Unauthenticated, "token expired"))]
    #[case(TransportError::status(Code::Internal, "broker bug"))]
    #[case(TransportError::Other("unexpected".to_string()))]
    fn test_other_errors_stop(#[case] error: TransportError) {
        assert!(!DefaultFailureDecision::is_retryable(&error));
        assert!(DefaultFailureDecision.should_stop(&ctx(), &error));
    }
}
