//! Deploy resource command

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zeebe_transport::types::{DeployResourceRequest, DeployResourceResponse, Resource};

use crate::client::Client;
use crate::error::{Error, Result};

#[derive(Debug)]
enum ResourceSource {
    File(PathBuf),
    Inline(Resource),
}

/// Deploys BPMN processes, DMN decisions and forms.
///
/// Resources are sent in the order they were added. Files are read when the
/// command is sent, and the path as given becomes the resource name.
///
/// # Examples
///
/// ```rust
/// use zeebe::Client;
/// use zeebe_transport::testing::MockGateway;
///
/// # async fn example() -> zeebe::Result<()> {
/// let client = Client::new(MockGateway::new())?;
/// let deployment = client
///     .new_deploy_resource_command()
///     .add_resource(b"<definitions/>".to_vec(), "order.bpmn")
///     .tenant_id("tenant-a")
///     .send()
///     .await?;
/// # let _ = deployment;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeployResourceCommand {
    client: Client,
    sources: Vec<ResourceSource>,
    tenant_id: Option<String>,
    request_timeout: Option<Duration>,
    token: Option<CancellationToken>,
}

impl DeployResourceCommand {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            sources: Vec::new(),
            tenant_id: None,
            request_timeout: None,
            token: None,
        }
    }

    /// Add a resource read from `path`.
    pub fn add_resource_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(ResourceSource::File(path.into()));
        self
    }

    /// Add a resource from memory.
    pub fn add_resource(mut self, content: impl Into<Vec<u8>>, name: impl Into<String>) -> Self {
        self.sources.push(ResourceSource::Inline(Resource {
            name: name.into(),
            content: content.into(),
        }));
        self
    }

    /// Deploy for `tenant_id`.
    ///
    /// Without it the request carries no tenant and the gateway picks its own default.
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
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

    /// Build the request, reading resource files.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if a resource file cannot be read
    /// - [`Error::InvalidRequest`] if no resource was added
    pub async fn request(&self) -> Result<DeployResourceRequest> {
        let mut resources = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source {
                ResourceSource::File(path) => {
                    let content = tokio::fs::read(path).await.map_err(|source| Error::Io {
                        path: path.clone(),
                        source,
                    })?;
                    resources.push(Resource {
                        name: path.to_string_lossy().into_owned(),
                        content,
                    });
                }
                ResourceSource::Inline(resource) => resources.push(resource.clone()),
            }
        }

        if resources.is_empty() {
            return Err(Error::InvalidRequest(
                "a deployment needs at least one resource".to_string(),
            ));
        }

        Ok(DeployResourceRequest {
            resources,
            tenant_id: self.tenant_id.clone(),
        })
    }

    /// Send the deployment.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`request`](Self::request), then the gateway
    /// error if the deployment fails fatally, or [`Error::Cancelled`].
    pub async fn send(self) -> Result<DeployResourceResponse> {
        let request = self.request().await?;
        let token = self
            .token
            .clone()
            .unwrap_or_else(|| self.client.shutdown_token());
        let timeout = self
            .request_timeout
            .unwrap_or(self.client.config().request_timeout);

        tracing::debug!(
            resources = request.resources.len(),
            tenant_id = request.tenant_id.as_deref(),
            "Deploying resources"
        );

        self.client
            .invoke(self.client.retry(), &token, timeout, |gateway| {
                let request = request.clone();
                async move { gateway.deploy_resource(request).await }
            })
            .await
    }
}
