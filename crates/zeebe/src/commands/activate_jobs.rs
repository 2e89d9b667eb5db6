//! Activate jobs command

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zeebe_transport::types::{ActivateJobsRequest, ActivatedJob};

use crate::client::{Client, GatewayRetry};
use crate::config::REQUEST_TIMEOUT_OFFSET;
use crate::error::{Error, Result};

/// Activates jobs of one type and locks them to a worker.
///
/// The gateway long-polls for up to the request timeout when no job is
/// available, so every attempt gets that timeout plus
/// [`REQUEST_TIMEOUT_OFFSET`] before it is abandoned.
#[derive(Debug, Clone)]
pub struct ActivateJobsCommand {
    client: Client,
    job_type: String,
    worker: Option<String>,
    timeout: Option<Duration>,
    max_jobs_to_activate: i32,
    fetch_variables: Vec<String>,
    request_timeout: Option<Duration>,
    tenant_ids: Vec<String>,
    token: Option<CancellationToken>,
}

impl ActivateJobsCommand {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            job_type: String::new(),
            worker: None,
            timeout: None,
            max_jobs_to_activate: 0,
            fetch_variables: Vec::new(),
            request_timeout: None,
            tenant_ids: Vec::new(),
            token: None,
        }
    }

    /// Job type to activate. Required.
    pub fn job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = job_type.into();
        self
    }

    /// Maximum number of jobs to activate. Required, must be positive.
    pub fn max_jobs_to_activate(mut self, max_jobs: i32) -> Self {
        self.max_jobs_to_activate = max_jobs;
        self
    }

    /// Name of the worker the jobs are locked to.
    pub fn worker_name(mut self, worker: impl Into<String>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// How long the jobs stay locked.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Only fetch these variables.
    pub fn fetch_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch_variables = names.into_iter().map(Into::into).collect();
        self
    }

    /// Long-poll timeout on the gateway side.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Activate jobs of these tenants instead of the client's default tenant.
    pub fn tenant_ids<I, S>(mut self, tenant_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tenant_ids = tenant_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Cancel the command when `token` is cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Build the request, applying client defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the job type is empty or
    /// `max_jobs_to_activate` is not positive.
    pub fn request(&self) -> Result<ActivateJobsRequest> {
        if self.job_type.trim().is_empty() {
            return Err(Error::InvalidRequest("job type must not be empty".to_string()));
        }
        if self.max_jobs_to_activate <= 0 {
            return Err(Error::InvalidRequest(format!(
                "max jobs to activate must be positive, got {}",
                self.max_jobs_to_activate
            )));
        }

        let config = self.client.config();
        let tenant_ids = if self.tenant_ids.is_empty() {
            vec![config.default_tenant_id.clone()]
        } else {
            self.tenant_ids.clone()
        };

        Ok(ActivateJobsRequest {
            job_type: self.job_type.clone(),
            worker: self
                .worker
                .clone()
                .unwrap_or_else(|| config.default_job_worker_name.clone()),
            timeout_ms: millis(self.timeout.unwrap_or(config.default_job_timeout)),
            max_jobs_to_activate: self.max_jobs_to_activate,
            fetch_variables: self.fetch_variables.clone(),
            request_timeout_ms: millis(self.long_poll_timeout()),
            tenant_ids,
        })
    }

    /// Send the activation and return the activated jobs.
    pub async fn send(self) -> Result<Vec<ActivatedJob>> {
        let token = self
            .token
            .clone()
            .unwrap_or_else(|| self.client.shutdown_token());
        self.send_with(self.client.retry(), &token).await
    }

    /// Send through a specific retry loop, as job workers do with their own backoff.
    pub(crate) async fn send_with(
        &self,
        retry: &GatewayRetry,
        token: &CancellationToken,
    ) -> Result<Vec<ActivatedJob>> {
        let request = self.request()?;
        let attempt_timeout = self.long_poll_timeout() + REQUEST_TIMEOUT_OFFSET;

        tracing::trace!(
            job_type = %request.job_type,
            max_jobs = request.max_jobs_to_activate,
            "Activating jobs"
        );

        let response = self
            .client
            .invoke(retry, token, attempt_timeout, |gateway| {
                let request = request.clone();
                async move { gateway.activate_jobs(request).await }
            })
            .await?;
        Ok(response.jobs)
    }

    fn long_poll_timeout(&self) -> Duration {
        self.request_timeout
            .unwrap_or(self.client.config().request_timeout)
    }
}

pub(crate) fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
