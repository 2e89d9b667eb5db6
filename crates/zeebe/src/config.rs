//! Configuration for the Zeebe client

use std::time::Duration;
use zeebe_core::ConfigError;
use zeebe_core::retry::ExponentialBackoff;

/// Default per-attempt timeout of gateway calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra client-side deadline on top of a job activation's long-poll timeout.
pub const REQUEST_TIMEOUT_OFFSET: Duration = Duration::from_secs(10);

/// Default name workers report when activating jobs.
pub const DEFAULT_JOB_WORKER_NAME: &str = "default";

/// Tenant used when none is configured.
pub const DEFAULT_TENANT_ID: &str = "<default>";

/// Configuration for the Zeebe client.
///
/// Holds the defaults commands and job workers fall back to, plus the backoff
/// settings used when retrying gateway calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Per-attempt timeout of gateway calls; also the long-poll timeout of job activation
    pub request_timeout: Duration,

    /// Worker name used when a worker or activation does not set one
    pub default_job_worker_name: String,

    /// Tenant used for activations that do not set one
    pub default_tenant_id: String,

    /// How long activated jobs stay locked to a worker
    pub default_job_timeout: Duration,

    /// How often an idle worker polls for new jobs
    pub default_job_poll_interval: Duration,

    /// Maximum number of jobs a worker handles at once
    pub default_job_worker_max_jobs_active: u32,

    /// Initial retry delay
    pub backoff_min_delay: Duration,

    /// Maximum retry delay
    pub backoff_max_delay: Duration,

    /// Growth factor between retry delays
    pub backoff_factor: f64,

    /// Relative jitter applied to retry delays
    pub backoff_jitter: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_job_worker_name: DEFAULT_JOB_WORKER_NAME.to_string(),
            default_tenant_id: DEFAULT_TENANT_ID.to_string(),
            default_job_timeout: Duration::from_secs(5 * 60),
            default_job_poll_interval: Duration::from_millis(100),
            default_job_worker_max_jobs_active: 32,
            backoff_min_delay: ExponentialBackoff::DEFAULT_MIN_DELAY,
            backoff_max_delay: ExponentialBackoff::DEFAULT_MAX_DELAY,
            backoff_factor: ExponentialBackoff::DEFAULT_BACKOFF_FACTOR,
            backoff_jitter: ExponentialBackoff::DEFAULT_JITTER_FACTOR,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first; variables
    /// already set in the process take precedence. This will look for:
    /// - `ZEEBE_REQUEST_TIMEOUT_MS` for the per-attempt timeout
    /// - `ZEEBE_DEFAULT_JOB_WORKER_NAME` for the worker name
    /// - `ZEEBE_DEFAULT_TENANT_ID` for the tenant
    /// - `ZEEBE_BACKOFF_MIN_DELAY_MS` and `ZEEBE_BACKOFF_MAX_DELAY_MS` for the delay bounds
    /// - `ZEEBE_BACKOFF_FACTOR` and `ZEEBE_BACKOFF_JITTER` for growth and jitter
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if a variable is set
    /// but cannot be parsed, or if the resulting backoff settings are invalid.
    #[cfg(feature = "env")]
    pub fn from_env() -> crate::error::Result<Self> {
        use std::env;

        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>("ZEEBE_REQUEST_TIMEOUT_MS")? {
            config.request_timeout = Duration::from_millis(ms);
        }

        if let Ok(name) = env::var("ZEEBE_DEFAULT_JOB_WORKER_NAME")
            && !name.is_empty()
        {
            config.default_job_worker_name = name;
        }

        if let Ok(tenant) = env::var("ZEEBE_DEFAULT_TENANT_ID")
            && !tenant.is_empty()
        {
            config.default_tenant_id = tenant;
        }

        if let Some(ms) = parse_var::<u64>("ZEEBE_BACKOFF_MIN_DELAY_MS")? {
            config.backoff_min_delay = Duration::from_millis(ms);
        }

        if let Some(ms) = parse_var::<u64>("ZEEBE_BACKOFF_MAX_DELAY_MS")? {
            config.backoff_max_delay = Duration::from_millis(ms);
        }

        if let Some(factor) = parse_var::<f64>("ZEEBE_BACKOFF_FACTOR")? {
            config.backoff_factor = factor;
        }

        if let Some(jitter) = parse_var::<f64>("ZEEBE_BACKOFF_JITTER")? {
            config.backoff_jitter = jitter;
        }

        config.backoff()?;
        Ok(config)
    }

    /// Set the per-attempt request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the default worker name.
    pub fn with_default_job_worker_name(mut self, name: impl Into<String>) -> Self {
        self.default_job_worker_name = name.into();
        self
    }

    /// Set the default tenant.
    pub fn with_default_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.default_tenant_id = tenant_id.into();
        self
    }

    /// Set the retry delay bounds.
    pub fn with_backoff_delays(mut self, min: Duration, max: Duration) -> Self {
        self.backoff_min_delay = min;
        self.backoff_max_delay = max;
        self
    }

    /// Set the retry delay growth and jitter factors.
    pub fn with_backoff_factors(mut self, factor: f64, jitter: f64) -> Self {
        self.backoff_factor = factor;
        self.backoff_jitter = jitter;
        self
    }

    /// Build the backoff supplier described by this configuration.
    pub fn backoff(&self) -> Result<ExponentialBackoff, ConfigError> {
        ExponentialBackoff::builder()
            .min_delay(self.backoff_min_delay)
            .max_delay(self.backoff_max_delay)
            .backoff_factor(self.backoff_factor)
            .jitter_factor(self.backoff_jitter)
            .build()
    }
}

#[cfg(feature = "env")]
fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
