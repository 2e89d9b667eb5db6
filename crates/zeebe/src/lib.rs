//! # Zeebe client
//!
//! Rust client SDK for the Zeebe workflow engine gateway supporting:
//! - Deploying BPMN processes, DMN decisions and forms
//! - Activating, completing and failing jobs
//! - Long-running job workers with bounded concurrency
//! - Exponential backoff with jitter on every gateway call
//!
//! The gateway itself is a collaborator behind the
//! [`Gateway`](zeebe_transport::Gateway) trait, so the SDK works with any
//! RPC stack (or with [`MockGateway`](zeebe_transport::testing::MockGateway)
//! in tests).
//!
//! ## Quick Start
//!
//! ```rust
//! use zeebe::{Client, ClientConfig};
//! use zeebe::worker::HandlerResult;
//! use zeebe_transport::testing::MockGateway;
//! use zeebe_transport::types::ActivatedJob;
//!
//! # async fn example() -> zeebe::Result<()> {
//! let client = Client::builder(MockGateway::new())
//!     .config(ClientConfig::default().with_default_job_worker_name("billing"))
//!     .build()?;
//!
//! client
//!     .new_deploy_resource_command()
//!     .add_resource_file("order-process.bpmn")
//!     .send()
//!     .await?;
//!
//! let worker = client
//!     .new_worker()
//!     .job_type("payment")
//!     .handler(|_job: ActivatedJob| async { HandlerResult::Ok(None) })
//!     .open()?;
//!
//! worker.close().await?;
//! client.close();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{Client, ClientBuilder, GatewayRetry};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use worker::{HandlerError, HandlerResult, JobHandler, JobWorker, JobWorkerBuilder};

// Module declarations
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod worker;

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub mod observability;

// Re-export the retry and transport crates for convenience
pub use zeebe_core::prelude::{
    BackoffSupplier, CancellationToken, ExponentialBackoff, FailureDecision,
};
pub use zeebe_core::retry::AttemptContext;
pub use zeebe_transport::{Code, DefaultFailureDecision, Gateway, TransportError};
