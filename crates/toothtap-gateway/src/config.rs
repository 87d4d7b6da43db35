//! Configuration loading for the gateway binary.
//!
//! The canonical configuration lives in `toothtap.yaml` at the project
//! root. Every field has a default, so an absent file yields a working
//! development setup (in-memory store, permissive dev auth).

use std::path::Path;

use serde::Deserialize;

use toothtap_session::SessionConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GatewayConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session and anti-abuse tuning.
    #[serde(default)]
    pub session: SessionConfig,

    /// Per-connection message rate limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DATABASE_URL` in the environment overrides `database.url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.database.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.database.apply_env_overrides();
        Ok(config)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// `PostgreSQL` connection configuration.
///
/// With no URL configured the gateway runs on the in-memory store,
/// which loses all progress on restart and exists for development.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL. `None` selects the in-memory store.
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Let `DATABASE_URL` from the environment override the YAML value.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            self.url = Some(url);
        }
    }
}

/// Per-connection message rate limits, enforced before any payload is
/// inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Sustained messages per second per connection.
    #[serde(default = "default_messages_per_second")]
    pub messages_per_second: u32,

    /// Burst allowance on top of the sustained rate.
    #[serde(default = "default_message_burst")]
    pub message_burst: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            messages_per_second: default_messages_per_second(),
            message_burst: default_message_burst(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_messages_per_second() -> u32 {
    20
}

const fn default_message_burst() -> u32 {
    40
}
