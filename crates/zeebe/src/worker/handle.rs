//! Handle to a running job worker

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// A running job worker.
///
/// Dropping the handle detaches the worker; it keeps polling until the
/// client is closed.
#[derive(Debug)]
pub struct JobWorker {
    job_type: String,
    name: String,
    token: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl JobWorker {
    pub(crate) fn new(
        job_type: String,
        name: String,
        token: CancellationToken,
        task: JoinHandle<Result<()>>,
    ) -> Self {
        Self {
            job_type,
            name,
            token,
            task,
        }
    }

    /// The job type this worker handles.
    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// The worker name reported to the gateway.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the worker was asked to stop or has stopped.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.task.is_finished()
    }

    /// Stop polling, wait for in-flight jobs, and return how the worker ended.
    ///
    /// # Errors
    ///
    /// Returns the fatal gateway error that stopped the worker earlier, if
    /// any, or [`Error::WorkerJoin`](crate::Error::WorkerJoin) if the worker
    /// task panicked.
    pub async fn close(self) -> Result<()> {
        tracing::debug!(job_type = %self.job_type, worker = %self.name, "Closing job worker");
        self.token.cancel();
        self.join().await
    }

    /// Wait for the worker to stop on its own.
    ///
    /// A worker only stops by itself when polling fails fatally, or when the
    /// client is closed.
    pub async fn join(self) -> Result<()> {
        self.task.await?
    }
}
