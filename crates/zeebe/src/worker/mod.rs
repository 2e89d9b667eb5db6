//! Job workers
//!
//! A job worker polls the gateway for jobs of one type and hands every
//! activated job to a [`JobHandler`] on its own task. Polling failures are
//! retried with exponential backoff: transient gateway errors delay the next
//! poll, fatal ones stop the worker.
//!
//! # Examples
//!
//! ```rust
//! use zeebe::Client;
//! use zeebe::worker::HandlerResult;
//! use zeebe_transport::testing::MockGateway;
//! use zeebe_transport::types::ActivatedJob;
//!
//! # async fn example() -> zeebe::Result<()> {
//! let client = Client::new(MockGateway::new())?;
//!
//! let worker = client
//!     .new_worker()
//!     .job_type("payment")
//!     .handler(|job: ActivatedJob| async move {
//!         tracing::info!(job_key = job.key, "Charging customer");
//!         HandlerResult::Ok(Some(r#"{"paid":true}"#.to_string()))
//!     })
//!     .max_jobs_active(8)
//!     .open()?;
//!
//! worker.close().await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod handle;
mod poller;

pub use builder::JobWorkerBuilder;
pub use handle::JobWorker;

use async_trait::async_trait;
use std::future::Future;
use zeebe_transport::types::ActivatedJob;

/// Error returned by a job handler; the job is failed with its message.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of handling one job.
///
/// `Ok(variables)` completes the job, merging `variables` (a JSON document)
/// when present. `Err` fails the job with one retry less than it had.
pub type HandlerResult = std::result::Result<Option<String>, HandlerError>;

/// Handles activated jobs.
///
/// Any `Fn(ActivatedJob) -> impl Future<Output = HandlerResult>` closure is a
/// handler.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Handle one job.
    async fn handle(&self, job: ActivatedJob) -> HandlerResult;
}

#[async_trait]
impl<F, Fut> JobHandler for F
where
    F: Fn(ActivatedJob) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, job: ActivatedJob) -> HandlerResult {
        (self)(job).await
    }
}
