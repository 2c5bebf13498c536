// Engine connection configuration
// Decision: Build one explicit config value at process entry and pass it by reference;
// nothing below the binaries reads the environment.

use std::path::Path;

/// Environment variables read by `EngineConfig::from_env`
pub const ENV_ADDRESS: &str = "TEMPORAL_ADDRESS";
pub const ENV_NAMESPACE: &str = "TEMPORAL_NAMESPACE";
pub const ENV_API_KEY: &str = "TEMPORAL_API_KEY";
pub const ENV_TASK_QUEUE: &str = "TEMPORAL_TASK_QUEUE";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", vars.join(", "))]
    Missing { vars: Vec<String> },

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Connection settings for the orchestration backend
#[derive(Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Service address (`host:port` or a full URL)
    pub address: String,
    pub namespace: String,
    pub api_key: String,
    /// Default task queue for workflow and schedule starts
    pub task_queue: String,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("api_key", &"[REDACTED]")
            .field("task_queue", &self.task_queue)
            .finish()
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables (all required):
    /// - `TEMPORAL_ADDRESS`: Service address
    /// - `TEMPORAL_NAMESPACE`: Namespace
    /// - `TEMPORAL_API_KEY`: API key sent as a bearer credential
    /// - `TEMPORAL_TASK_QUEUE`: Task queue name
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    ///
    /// Blank values count as missing. Every missing name is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |key: &str| match lookup(key) {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let address = read(ENV_ADDRESS);
        let namespace = read(ENV_NAMESPACE);
        let api_key = read(ENV_API_KEY);
        let task_queue = read(ENV_TASK_QUEUE);

        if !missing.is_empty() {
            return Err(ConfigError::Missing { vars: missing });
        }

        Ok(Self {
            address,
            namespace,
            api_key,
            task_queue,
        })
    }

    /// Base URL of the service, defaulting to plain HTTP when no scheme is given
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        }
    }

    /// Socket address to bind when serving (`address` without a scheme)
    pub fn listen_address(&self) -> String {
        self.address
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string()
    }
}

/// Load a `.env` file from the working directory, falling back to its parent
pub fn load_dotenv() {
    for candidate in [".env", "../.env"] {
        if !Path::new(candidate).exists() {
            continue;
        }
        match dotenvy::from_path(candidate) {
            Ok(()) => {
                tracing::info!(path = candidate, "Loaded environment file");
            }
            Err(e) => {
                tracing::warn!(path = candidate, error = %e, "Failed to parse environment file");
            }
        }
        return;
    }
    tracing::info!("No .env file found, using process environment");
}
