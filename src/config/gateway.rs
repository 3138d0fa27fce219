//! Gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prefix shared by all environment variables read by [`GatewayConfig::from_env`].
pub const ENV_PREFIX: &str = "PATENTPULSE_";

/// Tunables of the admission controller, worker pool and HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Maximum number of jobs waiting for a worker.
    pub queue_capacity: usize,
    /// Number of workers, i.e. the maximum number of in-flight analysis calls.
    pub worker_count: usize,
    /// How long admission waits for queue room before shedding a job (ms).
    pub admission_wait_timeout_ms: u64,
    /// Budget of a single downstream analysis call (ms).
    pub downstream_deadline_ms: u64,
    /// Upload size cap enforced by the HTTP layer (bytes).
    pub max_payload_bytes: usize,
    /// URL of the analysis service endpoint.
    pub collaborator_endpoint: String,
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            worker_count: 3,
            admission_wait_timeout_ms: 2_000,
            downstream_deadline_ms: 5_000,
            max_payload_bytes: 10 << 20,
            collaborator_endpoint: "http://localhost:5000/analyze".to_string(),
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the number of workers.
    #[must_use]
    pub const fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the admission wait window.
    #[must_use]
    pub fn with_admission_wait_timeout(mut self, wait: Duration) -> Self {
        self.admission_wait_timeout_ms = duration_ms(wait);
        self
    }

    /// Set the downstream call budget.
    #[must_use]
    pub fn with_downstream_deadline(mut self, deadline: Duration) -> Self {
        self.downstream_deadline_ms = duration_ms(deadline);
        self
    }

    /// Set the upload size cap.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    /// Set the analysis service URL.
    #[must_use]
    pub fn with_collaborator_endpoint(mut self, url: impl Into<String>) -> Self {
        self.collaborator_endpoint = url.into();
        self
    }

    /// Set the HTTP listen address.
    #[must_use]
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Admission wait window as a [`Duration`].
    #[must_use]
    pub const fn admission_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.admission_wait_timeout_ms)
    }

    /// Downstream call budget as a [`Duration`].
    #[must_use]
    pub const fn downstream_deadline(&self) -> Duration {
        Duration::from_millis(self.downstream_deadline_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.admission_wait_timeout_ms == 0 {
            return Err("admission_wait_timeout_ms must be greater than 0".into());
        }
        if self.downstream_deadline_ms == 0 {
            return Err("downstream_deadline_ms must be greater than 0".into());
        }
        if self.max_payload_bytes == 0 {
            return Err("max_payload_bytes must be greater than 0".into());
        }
        let url = reqwest::Url::parse(&self.collaborator_endpoint)
            .map_err(|e| format!("collaborator_endpoint is not a valid URL: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "collaborator_endpoint must use http or https, got `{}`",
                url.scheme()
            ));
        }
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| format!("listen_addr `{}` invalid: {e}", self.listen_addr))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Fields left out keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Recognized variables (all prefixed with `PATENTPULSE_`):
    /// `QUEUE_CAPACITY`, `WORKER_COUNT`, `ADMISSION_WAIT_MS`,
    /// `DOWNSTREAM_DEADLINE_MS`, `MAX_PAYLOAD_BYTES`, `COLLABORATOR_URL`,
    /// `LISTEN_ADDR`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse or the
    /// field that failed validation.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup, starting from
    /// defaults. Keys are looked up with the `PATENTPULSE_` prefix.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut cfg = Self::default();

        if let Some(v) = var("QUEUE_CAPACITY") {
            cfg.queue_capacity = parse_var("QUEUE_CAPACITY", &v)?;
        }
        if let Some(v) = var("WORKER_COUNT") {
            cfg.worker_count = parse_var("WORKER_COUNT", &v)?;
        }
        if let Some(v) = var("ADMISSION_WAIT_MS") {
            cfg.admission_wait_timeout_ms = parse_var("ADMISSION_WAIT_MS", &v)?;
        }
        if let Some(v) = var("DOWNSTREAM_DEADLINE_MS") {
            cfg.downstream_deadline_ms = parse_var("DOWNSTREAM_DEADLINE_MS", &v)?;
        }
        if let Some(v) = var("MAX_PAYLOAD_BYTES") {
            cfg.max_payload_bytes = parse_var("MAX_PAYLOAD_BYTES", &v)?;
        }
        if let Some(v) = var("COLLABORATOR_URL") {
            cfg.collaborator_endpoint = v;
        }
        if let Some(v) = var("LISTEN_ADDR") {
            cfg.listen_addr = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("{ENV_PREFIX}{name}=`{value}` invalid: {e}"))
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
