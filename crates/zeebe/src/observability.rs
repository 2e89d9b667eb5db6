//! Tracing subscriber setup for binaries and examples
//!
//! The SDK only emits `tracing` events; installing a subscriber is left to
//! the application. This module offers a ready-made one.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "zeebe=info,zeebe_core=info,zeebe_transport=info";

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// Falls back to [`DEFAULT_FILTER`] when `RUST_LOG` is unset or invalid.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
