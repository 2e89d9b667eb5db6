//! Poll loop and job dispatch of a worker

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use zeebe_transport::types::ActivatedJob;

use super::JobHandler;
use crate::client::{Client, GatewayRetry};
use crate::commands::ActivateJobsCommand;
use crate::error::{Error, Result};

pub(crate) struct Poller {
    pub(crate) client: Client,
    pub(crate) command: ActivateJobsCommand,
    pub(crate) handler: Arc<dyn JobHandler>,
    pub(crate) retry: GatewayRetry,
    pub(crate) token: CancellationToken,
    pub(crate) max_jobs_active: u32,
    pub(crate) poll_threshold: u32,
    pub(crate) poll_interval: Duration,
    /// One permit per job slot; held by a job task until the job is settled
    pub(crate) permits: Arc<Semaphore>,
    pub(crate) job_finished: Arc<Notify>,
}

impl Poller {
    /// Poll until cancelled or a fatal error, then wait for in-flight jobs.
    pub(crate) async fn run(self) -> Result<()> {
        let outcome = self.poll().await;

        // Every permit back means every job task has settled its job.
        if let Ok(permits) = self.permits.acquire_many(self.max_jobs_active).await {
            drop(permits);
        }

        match &outcome {
            Ok(()) => tracing::info!("Job worker closed"),
            Err(err) => tracing::error!(error = %err, "Job worker stopped on fatal error"),
        }
        outcome
    }

    async fn poll(&self) -> Result<()> {
        loop {
            if self.token.is_cancelled() {
                return Ok(());
            }

            let available = self.permits.available_permits() as u32;
            let active = self.max_jobs_active - available;
            if active > self.poll_threshold {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => return Ok(()),
                    _ = self.job_finished.notified() => {}
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
                continue;
            }

            let max_jobs = i32::try_from(available).unwrap_or(i32::MAX);
            let jobs = match self
                .command
                .clone()
                .max_jobs_to_activate(max_jobs)
                .send_with(&self.retry, &self.token)
                .await
            {
                Ok(jobs) => jobs,
                Err(Error::Cancelled) => return Ok(()),
                Err(err) => return Err(err),
            };

            if jobs.is_empty() {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
                continue;
            }

            tracing::debug!(activated = jobs.len(), "Activated jobs");
            for job in jobs {
                self.dispatch(job).await;
            }
        }
    }

    async fn dispatch(&self, job: ActivatedJob) {
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return;
        };

        let client = self.client.clone();
        let handler = Arc::clone(&self.handler);
        let job_finished = Arc::clone(&self.job_finished);
        tokio::spawn(async move {
            handle_job(&client, handler.as_ref(), job).await;
            drop(permit);
            job_finished.notify_one();
        });
    }
}

async fn handle_job(client: &Client, handler: &dyn JobHandler, job: ActivatedJob) {
    let job_key = job.key;
    let retries = job.retries;
    tracing::debug!(job_key, "Handling job");

    match handler.handle(job).await {
        Ok(variables) => {
            let mut command = client.new_complete_job_command(job_key);
            if let Some(variables) = variables {
                command = command.variables(variables);
            }
            if let Err(err) = command.send().await {
                tracing::warn!(job_key, error = %err, "Failed to complete job");
            }
        }
        Err(handler_err) => {
            tracing::warn!(job_key, error = %handler_err, "Job handler failed");
            let outcome = client
                .new_fail_job_command(job_key)
                .retries(retries.saturating_sub(1).max(0))
                .error_message(handler_err.to_string())
                .send()
                .await;
            if let Err(err) = outcome {
                tracing::warn!(job_key, error = %err, "Failed to fail job");
            }
        }
    }
}
