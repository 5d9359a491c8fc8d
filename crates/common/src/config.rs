//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::context::Context;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Repository behaviour.
    #[serde(default)]
    pub repository: RepositoryConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when opening or acquiring a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whether sqlx should log every statement.
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// Repository configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Upper bound on a single repository call, in seconds.
    /// `None` disables the default deadline.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: Option<u64>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl RepositoryConfig {
    /// The configured per-call timeout, if any.
    #[must_use]
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

#[allow(clippy::unnecessary_wraps)]
const fn default_query_timeout_secs() -> Option<u64> {
    Some(30)
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, via dotenvy)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FEDIMOJI_ENV`)
    /// 4. Environment variables with `FEDIMOJI__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let env = std::env::var("FEDIMOJI_ENV").unwrap_or_else(|_| "development".to_string());
        tracing::debug!(environment = %env, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FEDIMOJI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FEDIMOJI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// A fresh context bounded by the configured query timeout.
    #[must_use]
    pub fn default_context(&self) -> Context {
        match self.repository.query_timeout() {
            Some(timeout) => Context::with_timeout(timeout),
            None => Context::background(),
        }
    }
}
