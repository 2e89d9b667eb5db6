//! Error types for the Zeebe client
//!
//! Gateway failures keep their transport shape so callers can still match on
//! the status code; everything the SDK itself rejects gets its own variant.

use std::path::PathBuf;
use thiserror::Error;
use zeebe_core::ConfigError;
use zeebe_core::retry::RetryError;
use zeebe_transport::TransportError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Zeebe client.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid client or backoff configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The gateway call failed fatally or ran out of attempts.
    #[error("Gateway error: {0}")]
    Transport(#[from] TransportError),

    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// A command was sent with missing or invalid parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A resource file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    WorkerJoin(String),
}

impl Error {
    /// Returns true if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The transport error behind this error, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RetryError<TransportError>> for Error {
    fn from(err: RetryError<TransportError>) -> Self {
        match err {
            RetryError::Fatal(err) | RetryError::Exhausted { source: err, .. } => {
                Self::Transport(err)
            }
            RetryError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::WorkerJoin(err.to_string())
    }
}
