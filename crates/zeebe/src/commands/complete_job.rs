//! Complete job command

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zeebe_transport::types::{CompleteJobRequest, CompleteJobResponse};

use crate::client::Client;
use crate::error::Result;

/// Completes an activated job.
#[derive(Debug, Clone)]
pub struct CompleteJobCommand {
    client: Client,
    job_key: i64,
    variables: Option<String>,
    request_timeout: Option<Duration>,
    token: Option<CancellationToken>,
}

impl CompleteJobCommand {
    pub(crate) fn new(client: Client, job_key: i64) -> Self {
        Self {
            client,
            job_key,
            variables: None,
            request_timeout: None,
            token: None,
        }
    }

    /// Variables to merge into the process instance, as a JSON document.
    ///
    /// The document is passed through untouched.
    pub fn variables(mut self, variables: impl Into<String>) -> Self {
        self.variables = Some(variables.into());
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

    /// Send the completion.
    pub async fn send(self) -> Result<CompleteJobResponse> {
        let request = CompleteJobRequest {
            job_key: self.job_key,
            variables: self.variables,
        };
        let token = self.token.unwrap_or_else(|| self.client.shutdown_token());
        let timeout = self
            .request_timeout
            .unwrap_or(self.client.config().request_timeout);

        self.client
            .invoke(self.client.retry(), &token, timeout, |gateway| {
                let request = request.clone();
                async move { gateway.complete_job(request).await }
            })
            .await
    }
}
