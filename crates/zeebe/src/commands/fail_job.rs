//! Fail job command

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zeebe_transport::types::{FailJobRequest, FailJobResponse};

use super::activate_jobs::millis;
use crate::client::Client;
use crate::error::Result;

/// Marks an activated job as failed.
///
/// With retries left the job becomes activatable again after the retry
/// back-off; with zero retries the broker raises an incident.
#[derive(Debug, Clone)]
pub struct FailJobCommand {
    client: Client,
    job_key: i64,
    retries: i32,
    error_message: String,
    retry_back_off: Duration,
    request_timeout: Option<Duration>,
    token: Option<CancellationToken>,
}

impl FailJobCommand {
    pub(crate) fn new(client: Client, job_key: i64) -> Self {
        Self {
            client,
            job_key,
            retries: 0,
            error_message: String::new(),
            retry_back_off: Duration::ZERO,
            request_timeout: None,
            token: None,
        }
    }

    /// Retries left for the job.
    pub fn retries(mut self, retries: i32) -> Self {
        self.retries = retries;
        self
    }

    /// Message describing the failure.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Delay before the job can be activated again.
    pub fn retry_back_off(mut self, back_off: Duration) -> Self {
        self.retry_back_off = back_off;
        self
    }

    /// Override the per-attempt timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Cancel the command when `token` is cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Send the failure.
    pub async fn send(self) -> Result<FailJobResponse> {
        let request = FailJobRequest {
            job_key: self.job_key,
            retries: self.retries,
            error_message: self.error_message,
            retry_back_off_ms: millis(self.retry_back_off),
        };
        let token = self.token.unwrap_or_else(|| self.client.shutdown_token());
        let timeout = self
            .request_timeout
            .unwrap_or(self.client.config().request_timeout);

        self.client
            .invoke(self.client.retry(), &token, timeout, |gateway| {
                let request = request.clone();
                async move { gateway.fail_job(request).await }
            })
            .await
    }
}
