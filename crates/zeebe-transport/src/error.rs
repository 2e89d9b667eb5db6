//! Transport error types

use std::fmt;
use std::time::Duration;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Status codes a gateway reports, following the gRPC code set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// The call was cancelled by the caller
    Cancelled,
    /// Unknown error
    Unknown,
    /// The request was malformed
    InvalidArgument,
    /// The deadline expired before the call completed
    DeadlineExceeded,
    /// A referenced entity does not exist
    NotFound,
    /// The entity already exists
    AlreadyExists,
    /// The caller lacks permission
    PermissionDenied,
    /// The gateway or broker is out of capacity (backpressure)
    ResourceExhausted,
    /// The system is not in a state required for the call
    FailedPrecondition,
    /// The call was aborted, usually due to a concurrency conflict
    Aborted,
    /// The call is not implemented by the gateway
    Unimplemented,
    /// Internal gateway error
    Internal,
    /// The gateway is currently unreachable
    Unavailable,
    /// The caller is not authenticated
    Unauthenticated,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when invoking the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The gateway answered with a non-OK status
    Status {
        /// Status code
        code: Code,
        /// Status message from the gateway
        message: String,
    },

    /// The connection could not be established or was lost
    Connection(String),

    /// The call did not complete within its per-attempt timeout
    DeadlineExceeded(Duration),

    /// Generic transport error
    Other(String),
}

impl TransportError {
    /// Create a status error
    pub fn status(code: Code, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// The status code this error maps to
    pub fn code(&self) -> Code {
        match self {
            Self::Status { code, .. } => *code,
            Self::Connection(_) => Code::Unavailable,
            Self::DeadlineExceeded(_) => Code::DeadlineExceeded,
            Self::Other(_) => Code::Unknown,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { code, message } => write!(f, "{}: {}", code, message),
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::DeadlineExceeded(timeout) => write!(f, "Deadline exceeded after {:?}", timeout),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Connection(err.to_string())
    }
}
