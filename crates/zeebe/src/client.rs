//! Main client implementation for the Zeebe gateway

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zeebe_core::retry::{BackoffSupplier, FailureDecision, RetryLoop};
use zeebe_transport::{DefaultFailureDecision, Gateway, TransportError};

use crate::commands::{
    ActivateJobsCommand, CompleteJobCommand, DeployResourceCommand, FailJobCommand,
};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::worker::JobWorkerBuilder;

/// Retry loop shared by every gateway call of a client.
pub type GatewayRetry = RetryLoop<dyn BackoffSupplier, dyn FailureDecision<TransportError>>;

/// Main client for interacting with a Zeebe gateway.
///
/// Cloning is cheap; clones share the gateway, configuration and retry
/// policy. Every command is retried with exponential backoff until it
/// succeeds, fails fatally, or is cancelled.
///
/// # Example
///
/// ```rust
/// use zeebe::Client;
/// use zeebe_transport::testing::MockGateway;
///
/// # async fn example() -> zeebe::Result<()> {
/// let client = Client::new(MockGateway::new())?;
///
/// let response = client
///     .new_deploy_resource_command()
///     .add_resource(b"<definitions/>".to_vec(), "order.bpmn")
///     .send()
///     .await?;
/// # let _ = response;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    gateway: Arc<dyn Gateway>,
    config: ClientConfig,
    retry: GatewayRetry,
    shutdown: CancellationToken,
}

impl Client {
    /// Create a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the default backoff
    /// settings are invalid, which never happens for [`ClientConfig::default`].
    pub fn new(gateway: impl Gateway + 'static) -> Result<Self> {
        Self::builder(gateway).build()
    }

    /// Create a client configured from the environment.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    #[cfg(feature = "env")]
    pub fn from_env(gateway: impl Gateway + 'static) -> Result<Self> {
        Self::builder(gateway).config(ClientConfig::from_env()?).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder(gateway: impl Gateway + 'static) -> ClientBuilder {
        ClientBuilder::new(Arc::new(gateway))
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The gateway this client talks to.
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.inner.gateway
    }

    /// The retry policy applied to commands.
    pub fn retry(&self) -> &GatewayRetry {
        &self.inner.retry
    }

    /// Start building a deployment.
    pub fn new_deploy_resource_command(&self) -> DeployResourceCommand {
        DeployResourceCommand::new(self.clone())
    }

    /// Start building a job activation.
    pub fn new_activate_jobs_command(&self) -> ActivateJobsCommand {
        ActivateJobsCommand::new(self.clone())
    }

    /// Start building a job completion.
    pub fn new_complete_job_command(&self, job_key: i64) -> CompleteJobCommand {
        CompleteJobCommand::new(self.clone(), job_key)
    }

    /// Start building a job failure.
    pub fn new_fail_job_command(&self, job_key: i64) -> FailJobCommand {
        FailJobCommand::new(self.clone(), job_key)
    }

    /// Start building a job worker.
    pub fn new_worker(&self) -> JobWorkerBuilder {
        JobWorkerBuilder::new(self.clone())
    }

    /// Cancel every in-flight command and worker of this client.
    pub fn close(&self) {
        tracing::debug!("Closing client");
        self.inner.shutdown.cancel();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// A token cancelled when the client is closed.
    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.child_token()
    }

    /// Invoke one RPC through `retry`, bounding every attempt by `attempt_timeout`.
    ///
    /// `rpc` is called once per attempt with the gateway and must build a
    /// fresh request each time.
    pub(crate) async fn invoke<T, F, Fut>(
        &self,
        retry: &GatewayRetry,
        token: &CancellationToken,
        attempt_timeout: Duration,
        mut rpc: F,
    ) -> Result<T>
    where
        F: FnMut(Arc<dyn Gateway>) -> Fut,
        Fut: Future<Output = zeebe_transport::Result<T>>,
    {
        let gateway = &self.inner.gateway;
        let value = retry
            .run(token, |_ctx| {
                let call = rpc(Arc::clone(gateway));
                async move {
                    match tokio::time::timeout(attempt_timeout, call).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(TransportError::DeadlineExceeded(attempt_timeout)),
                    }
                }
            })
            .await?;
        Ok(value)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("retry", &self.inner.retry)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Builder for creating a configured [`Client`].
pub struct ClientBuilder {
    gateway: Arc<dyn Gateway>,
    config: ClientConfig,
    backoff: Option<Arc<dyn BackoffSupplier>>,
    decision: Option<Arc<dyn FailureDecision<TransportError>>>,
    max_attempts: Option<u32>,
}

impl ClientBuilder {
    fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            config: ClientConfig::default(),
            backoff: None,
            decision: None,
            max_attempts: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-attempt request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Use a custom backoff supplier instead of the one built from the configuration.
    pub fn backoff(mut self, backoff: impl BackoffSupplier + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Use a custom failure decision instead of [`DefaultFailureDecision`].
    pub fn failure_decision(
        mut self,
        decision: impl FailureDecision<TransportError> + 'static,
    ) -> Self {
        self.decision = Some(Arc::new(decision));
        self
    }

    /// Give up on a command after `max_attempts` attempts.
    ///
    /// Unlimited by default; fatal errors always stop at once.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Build the client with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if no custom backoff was
    /// set and the configured backoff settings are invalid.
    pub fn build(self) -> Result<Client> {
        let backoff: Arc<dyn BackoffSupplier> = match self.backoff {
            Some(backoff) => backoff,
            None => Arc::new(self.config.backoff()?),
        };
        let decision: Arc<dyn FailureDecision<TransportError>> = match self.decision {
            Some(decision) => decision,
            None => Arc::new(DefaultFailureDecision),
        };

        let mut retry = RetryLoop::from_shared(backoff, decision);
        if let Some(max_attempts) = self.max_attempts {
            retry = retry.with_max_attempts(max_attempts);
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                gateway: self.gateway,
                config: self.config,
                retry,
                shutdown: CancellationToken::new(),
            }),
        })
    }
}
