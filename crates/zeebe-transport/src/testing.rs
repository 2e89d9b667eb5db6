//! Testing utilities for integration tests
//!
//! Provides an in-memory gateway so clients and job workers can be exercised
//! without a running broker.

use crate::error::Result;
use crate::traits::Gateway;
use crate::types::{
    ActivateJobsRequest, ActivateJobsResponse, ActivatedJob, CompleteJobRequest,
    CompleteJobResponse, DeployResourceRequest, DeployResourceResponse, FailJobRequest,
    FailJobResponse,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Calls received by a [`MockGateway`], in arrival order per RPC.
#[derive(Debug, Clone, Default)]
pub struct RecordedCalls {
    /// Deploy requests
    pub deploy_resource: Vec<DeployResourceRequest>,
    /// Activation requests
    pub activate_jobs: Vec<ActivateJobsRequest>,
    /// Completion requests
    pub complete_job: Vec<CompleteJobRequest>,
    /// Failure requests
    pub fail_job: Vec<FailJobRequest>,
}

#[derive(Default)]
struct Scripts {
    deploy_resource: VecDeque<Result<DeployResourceResponse>>,
    activate_jobs: VecDeque<Result<ActivateJobsResponse>>,
    complete_job: VecDeque<Result<CompleteJobResponse>>,
    fail_job: VecDeque<Result<FailJobResponse>>,
}

/// Mock gateway for testing that replays scripted replies
///
/// Allows tests to:
/// - Queue replies (or errors) per RPC, returned in FIFO order
/// - Inspect every request that was sent
/// - Simulate gateway latency on job activation
///
/// When a queue runs dry the gateway answers with an empty success, which
/// for `activate_jobs` means "no jobs available".
///
/// # Examples
///
/// ```rust
/// use zeebe_transport::testing::MockGateway;
/// use zeebe_transport::types::ActivateJobsRequest;
/// use zeebe_transport::{Code, Gateway, TransportError};
///
/// # async fn example() {
/// let gateway = MockGateway::new();
/// gateway.push_activate_jobs(Err(TransportError::status(Code::Unavailable, "down"))).await;
///
/// assert!(gateway.activate_jobs(ActivateJobsRequest::default()).await.is_err());
/// assert!(gateway.activate_jobs(ActivateJobsRequest::default()).await.is_ok());
/// assert_eq!(gateway.calls().await.activate_jobs.len(), 2);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MockGateway {
    scripts: Arc<Mutex<Scripts>>,
    calls: Arc<Mutex<RecordedCalls>>,
    activation_delay: Option<Duration>,
}

impl MockGateway {
    /// Create a new mock gateway with empty scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every activation by `delay`, like a long-polling gateway
    pub fn with_activation_delay(mut self, delay: Duration) -> Self {
        self.activation_delay = Some(delay);
        self
    }

    /// Queue a reply for the next `deploy_resource` call
    pub async fn push_deploy_resource(&self, reply: Result<DeployResourceResponse>) {
        self.scripts.lock().await.deploy_resource.push_back(reply);
    }

    /// Queue a reply for the next `activate_jobs` call
    pub async fn push_activate_jobs(&self, reply: Result<ActivateJobsResponse>) {
        self.scripts.lock().await.activate_jobs.push_back(reply);
    }

    /// Queue a batch of jobs for the next `activate_jobs` call
    pub async fn push_jobs(&self, jobs: Vec<ActivatedJob>) {
        self.push_activate_jobs(Ok(ActivateJobsResponse { jobs })).await;
    }

    /// Queue a reply for the next `complete_job` call
    pub async fn push_complete_job(&self, reply: Result<CompleteJobResponse>) {
        self.scripts.lock().await.complete_job.push_back(reply);
    }

    /// Queue a reply for the next `fail_job` call
    pub async fn push_fail_job(&self, reply: Result<FailJobResponse>) {
        self.scripts.lock().await.fail_job.push_back(reply);
    }

    /// Get a snapshot of all received calls
    pub async fn calls(&self) -> RecordedCalls {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn deploy_resource(
        &self,
        request: DeployResourceRequest,
    ) -> Result<DeployResourceResponse> {
        self.calls.lock().await.deploy_resource.push(request);
        self.scripts
            .lock()
            .await
            .deploy_resource
            .pop_front()
            .unwrap_or_else(|| Ok(DeployResourceResponse::default()))
    }

    async fn activate_jobs(&self, request: ActivateJobsRequest) -> Result<ActivateJobsResponse> {
        self.calls.lock().await.activate_jobs.push(request);
        if let Some(delay) = self.activation_delay {
            tokio::time::sleep(delay).await;
        }
        self.scripts
            .lock()
            .await
            .activate_jobs
            .pop_front()
            .unwrap_or_else(|| Ok(ActivateJobsResponse::default()))
    }

    async fn complete_job(&self, request: CompleteJobRequest) -> Result<CompleteJobResponse> {
        self.calls.lock().await.complete_job.push(request);
        self.scripts
            .lock()
            .await
            .complete_job
            .pop_front()
            .unwrap_or_else(|| Ok(CompleteJobResponse::default()))
    }

    async fn fail_job(&self, request: FailJobRequest) -> Result<FailJobResponse> {
        self.calls.lock().await.fail_job.push(request);
        self.scripts
            .lock()
            .await
            .fail_job
            .pop_front()
            .unwrap_or_else(|| Ok(FailJobResponse::default()))
    }
}

/// Build an activated job of `job_type` with the given key.
pub fn job(key: i64, job_type: &str) -> ActivatedJob {
    ActivatedJob {
        key,
        job_type: job_type.to_string(),
        process_instance_key: key * 10,
        bpmn_process_id: "order-process".to_string(),
        element_id: "task".to_string(),
        retries: 3,
        custom_headers: "{}".to_string(),
        variables: "{}".to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Code, TransportError};

    #[test]
    fn test_scripted_replies_then_defaults() {
        tokio_test::block_on(async {
            let gateway = MockGateway::new();
            gateway
                .push_activate_jobs(Err(TransportError::status(Code::Unavailable, "down")))
                .await;
            gateway.push_jobs(vec![job(1, "payment")]).await;

            let request = ActivateJobsRequest {
                job_type: "payment".into(),
                ..Default::default()
            };
            assert!(gateway.activate_jobs(request.clone()).await.is_err());
            assert_eq!(gateway.activate_jobs(request.clone()).await.unwrap().jobs.len(), 1);
            assert!(gateway.activate_jobs(request).await.unwrap().jobs.is_empty());

            let calls = gateway.calls().await;
            assert_eq!(calls.activate_jobs.len(), 3);
            assert_eq!(calls.activate_jobs[0].job_type, "payment");
        });
    }

    #[test]
    fn test_records_job_commands() {
        tokio_test::block_on(async {
            let gateway = MockGateway::new();
            gateway
                .complete_job(CompleteJobRequest {
                    job_key: 7,
                    variables: Some(r#"{"paid":true}"#.into()),
                })
                .await
                .unwrap();
            gateway
                .fail_job(FailJobRequest {
                    job_key: 8,
                    retries: 2,
                    ..Default::default()
                })
                .await
                .unwrap();

            let calls = gateway.calls().await;
            assert_eq!(calls.complete_job[0].job_key, 7);
            assert_eq!(calls.fail_job[0].retries, 2);
        });
    }
}
