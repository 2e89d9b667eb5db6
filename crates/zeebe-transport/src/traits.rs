//! Gateway trait
//!
//! Defines the RPC surface the SDK needs from the orchestration service.
//! Implementations wrap a generated gRPC client, a proxy, or a test double.

use crate::error::Result;
use crate::types::{
    ActivateJobsRequest, ActivateJobsResponse, CompleteJobRequest, CompleteJobResponse,
    DeployResourceRequest, DeployResourceResponse, FailJobRequest, FailJobResponse,
};
use async_trait::async_trait;
use std::sync::Arc;

/// One async method per gateway RPC.
///
/// Each call is a single attempt. Retrying, timeouts and cancellation are
/// layered on top by the client, so implementations should report failures
/// as they are and not retry internally.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Deploy resources
    async fn deploy_resource(
        &self,
        request: DeployResourceRequest,
    ) -> Result<DeployResourceResponse>;

    /// Activate jobs of one type
    async fn activate_jobs(&self, request: ActivateJobsRequest) -> Result<ActivateJobsResponse>;

    /// Complete a job
    async fn complete_job(&self, request: CompleteJobRequest) -> Result<CompleteJobResponse>;

    /// Fail a job
    async fn fail_job(&self, request: FailJobRequest) -> Result<FailJobResponse>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn deploy_resource(
        &self,
        request: DeployResourceRequest,
    ) -> Result<DeployResourceResponse> {
        (**self).deploy_resource(request).await
    }

    async fn activate_jobs(&self, request: ActivateJobsRequest) -> Result<ActivateJobsResponse> {
        (**self).activate_jobs(request).await
    }

    async fn complete_job(&self, request: CompleteJobRequest) -> Result<CompleteJobResponse> {
        (**self).complete_job(request).await
    }

    async fn fail_job(&self, request: FailJobRequest) -> Result<FailJobResponse> {
        (**self).fail_job(request).await
    }
}
