//! Job worker builder

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};
use zeebe_core::retry::{BackoffSupplier, FailureDecision, RetryLoop};
use zeebe_transport::TransportError;

use super::handle::JobWorker;
use super::poller::Poller;
use super::JobHandler;
use crate::client::Client;
use crate::error::{Error, Result};

/// Fraction of `max_jobs_active` below which the worker polls for more jobs.
pub const DEFAULT_POLL_THRESHOLD: f64 = 0.3;

/// Builder for a [`JobWorker`].
///
/// Only the job type and the handler are required; everything else falls
/// back to the client configuration.
pub struct JobWorkerBuilder {
    client: Client,
    job_type: String,
    handler: Option<Arc<dyn JobHandler>>,
    name: Option<String>,
    timeout: Option<Duration>,
    max_jobs_active: Option<u32>,
    poll_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    fetch_variables: Vec<String>,
    tenant_ids: Vec<String>,
    backoff: Option<Arc<dyn BackoffSupplier>>,
    decision: Option<Arc<dyn FailureDecision<TransportError>>>,
}

impl JobWorkerBuilder {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            job_type: String::new(),
            handler: None,
            name: None,
            timeout: None,
            max_jobs_active: None,
            poll_interval: None,
            request_timeout: None,
            fetch_variables: Vec::new(),
            tenant_ids: Vec::new(),
            backoff: None,
            decision: None,
        }
    }

    /// Job type to work on. Required.
    pub fn job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = job_type.into();
        self
    }

    /// Handler invoked for every activated job. Required.
    pub fn handler(mut self, handler: impl JobHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Worker name reported to the gateway.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// How long activated jobs stay locked to this worker.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Maximum number of jobs handled at once.
    pub fn max_jobs_active(mut self, max_jobs_active: u32) -> Self {
        self.max_jobs_active = Some(max_jobs_active);
        self
    }

    /// Pause between polls that activated nothing.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Long-poll timeout of each activation.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
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

    /// Work on jobs of these tenants.
    pub fn tenant_ids<I, S>(mut self, tenant_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tenant_ids = tenant_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Backoff between failed polls; defaults to the client's.
    pub fn backoff(mut self, backoff: impl BackoffSupplier + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Decides which poll failures stop the worker; defaults to the client's.
    pub fn failure_decision(
        mut self,
        decision: impl FailureDecision<TransportError> + 'static,
    ) -> Self {
        self.decision = Some(Arc::new(decision));
        self
    }

    /// Start the worker.
    ///
    /// Polling begins immediately on a spawned task. Transient poll failures
    /// are retried without limit, whatever the client's attempt limit is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the job type or handler is
    /// missing, or `max_jobs_active` is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn open(self) -> Result<JobWorker> {
        if self.job_type.trim().is_empty() {
            return Err(Error::InvalidRequest("job type must not be empty".to_string()));
        }
        let Some(handler) = self.handler else {
            return Err(Error::InvalidRequest("a job handler is required".to_string()));
        };

        let config = self.client.config();
        let max_jobs_active = self
            .max_jobs_active
            .unwrap_or(config.default_job_worker_max_jobs_active);
        if max_jobs_active == 0 {
            return Err(Error::InvalidRequest(
                "max jobs active must be positive".to_string(),
            ));
        }
        let name = self
            .name
            .unwrap_or_else(|| config.default_job_worker_name.clone());
        let poll_interval = self.poll_interval.unwrap_or(config.default_job_poll_interval);

        let mut command = self
            .client
            .new_activate_jobs_command()
            .job_type(self.job_type.clone())
            .worker_name(name.clone())
            .timeout(self.timeout.unwrap_or(config.default_job_timeout))
            .fetch_variables(self.fetch_variables);
        if let Some(request_timeout) = self.request_timeout {
            command = command.request_timeout(request_timeout);
        }
        if !self.tenant_ids.is_empty() {
            command = command.tenant_ids(self.tenant_ids);
        }

        let retry = RetryLoop::from_shared(
            self.backoff
                .unwrap_or_else(|| Arc::clone(self.client.retry().backoff())),
            self.decision
                .unwrap_or_else(|| Arc::clone(self.client.retry().decision())),
        );

        let token = self.client.shutdown_token();
        let poller = Poller {
            client: self.client.clone(),
            command,
            handler,
            retry,
            token: token.clone(),
            max_jobs_active,
            poll_threshold: poll_threshold(max_jobs_active),
            poll_interval,
            permits: Arc::new(Semaphore::new(max_jobs_active as usize)),
            job_finished: Arc::new(Notify::new()),
        };

        tracing::info!(
            job_type = %self.job_type,
            worker = %name,
            max_jobs_active,
            "Opening job worker"
        );

        let task = tokio::spawn(poller.run());
        Ok(JobWorker::new(self.job_type, name, token, task))
    }
}

impl std::fmt::Debug for JobWorkerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobWorkerBuilder")
            .field("job_type", &self.job_type)
            .field("name", &self.name)
            .field("max_jobs_active", &self.max_jobs_active)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

fn poll_threshold(max_jobs_active: u32) -> u32 {
    (f64::from(max_jobs_active) * DEFAULT_POLL_THRESHOLD) as u32
}
