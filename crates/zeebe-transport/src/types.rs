//! Values exchanged with the gateway.
//!
//! These mirror the gateway protocol messages the SDK uses. Job variables and
//! custom headers travel as opaque JSON documents; the SDK never parses them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A deployable resource (BPMN process, DMN decision, form, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name, usually the file name; the gateway derives the type from its extension
    pub name: String,
    /// Raw resource content
    pub content: Vec<u8>,
}

/// Request to deploy one or more resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResourceRequest {
    /// Resources to deploy, in order
    pub resources: Vec<Resource>,
    /// Tenant owning the deployment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Metadata of a deployed process definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetadata {
    /// BPMN process id
    pub bpmn_process_id: String,
    /// Version assigned by the broker
    pub version: i32,
    /// Unique key of the process definition
    pub process_definition_key: i64,
    /// Name of the resource the process was parsed from
    pub resource_name: String,
}

/// Metadata of a deployed decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionMetadata {
    /// Decision id from the DMN
    pub dmn_decision_id: String,
    /// Decision name
    pub dmn_decision_name: String,
    /// Version assigned by the broker
    pub version: i32,
    /// Unique key of the decision
    pub decision_key: i64,
}

/// Metadata of a deployed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMetadata {
    /// Form id
    pub form_id: String,
    /// Version assigned by the broker
    pub version: i32,
    /// Unique key of the form
    pub form_key: i64,
    /// Name of the resource the form was read from
    pub resource_name: String,
}

/// One deployed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Deployment {
    /// A process definition
    Process(ProcessMetadata),
    /// A decision
    Decision(DecisionMetadata),
    /// A form
    Form(FormMetadata),
}

/// Response to [`DeployResourceRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResourceResponse {
    /// Unique key of the deployment
    pub key: i64,
    /// Deployed artifacts
    pub deployments: Vec<Deployment>,
    /// Tenant owning the deployment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Request to activate jobs of a given type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateJobsRequest {
    /// Job type to activate
    #[serde(rename = "type")]
    pub job_type: String,
    /// Name of the worker activating the jobs
    pub worker: String,
    /// How long activated jobs stay locked to this worker, in milliseconds
    pub timeout_ms: i64,
    /// Maximum number of jobs to activate
    pub max_jobs_to_activate: i32,
    /// Variables to fetch; empty means all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fetch_variables: Vec<String>,
    /// Long-polling timeout on the gateway side, in milliseconds
    pub request_timeout_ms: i64,
    /// Tenants to activate jobs for; empty means the default tenant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tenant_ids: Vec<String>,
}

/// A job locked to a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedJob {
    /// Unique job key
    pub key: i64,
    /// Job type
    #[serde(rename = "type")]
    pub job_type: String,
    /// Key of the process instance the job belongs to
    pub process_instance_key: i64,
    /// BPMN process id
    pub bpmn_process_id: String,
    /// Id of the element that created the job
    pub element_id: String,
    /// Remaining retries
    pub retries: i32,
    /// Lock expiry, as epoch milliseconds
    pub deadline: i64,
    /// Custom headers as a JSON document
    pub custom_headers: String,
    /// Job variables as a JSON document
    pub variables: String,
    /// Worker the job is locked to
    pub worker: String,
    /// Tenant owning the job
    #[serde(default)]
    pub tenant_id: String,
}

/// Response to [`ActivateJobsRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateJobsResponse {
    /// Activated jobs, possibly empty
    pub jobs: Vec<ActivatedJob>,
}

/// Request to complete a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobRequest {
    /// Key of the job to complete
    pub job_key: i64,
    /// Variables to merge into the process instance, as a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<String>,
}

/// Response to [`CompleteJobRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteJobResponse {}

/// Request to mark a job as failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailJobRequest {
    /// Key of the job to fail
    pub job_key: i64,
    /// Retries left after this failure; zero raises an incident
    pub retries: i32,
    /// Message describing the failure
    #[serde(default)]
    pub error_message: String,
    /// Delay before the job becomes activatable again, in milliseconds
    #[serde(default)]
    pub retry_back_off_ms: i64,
}

/// Response to [`FailJobRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailJobResponse {}

/// Custom headers of a job, when the caller chooses to decode them.
pub type CustomHeaders = HashMap<String, String>;

impl ActivatedJob {
    /// Decode the custom headers document.
    ///
    /// Headers are flat string pairs set on the task definition; unlike job
    /// variables they have a fixed shape.
    pub fn custom_headers_map(&self) -> serde_json::Result<CustomHeaders> {
        if self.custom_headers.trim().is_empty() {
            return Ok(CustomHeaders::new());
        }
        serde_json::from_str(&self.custom_headers)
    }
}
