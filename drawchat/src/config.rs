use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::link::DEFAULT_ENDPOINT;

/// Default YAML file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "drawchat.yaml";

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. drawchat.yaml file (if exists)
/// 3. Environment variables with DRAWCHAT_ prefix (always wins)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Endpoint the signed query string is appended to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeysConfig {
    /// PKCS#8 or SEC1 PEM private key.
    #[serde(default = "default_private_key_path")]
    pub private_key_path: PathBuf,

    /// SPKI PEM public key.
    #[serde(default = "default_public_key_path")]
    pub public_key_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_private_key_path() -> PathBuf {
    PathBuf::from("keys/.private.key")
}

fn default_public_key_path() -> PathBuf {
    PathBuf::from("keys/public.key")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            private_key_path: default_private_key_path(),
            public_key_path: default_public_key_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// A missing file is not an error; its layer is simply empty.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("DRAWCHAT_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = &self.link.endpoint;
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(ConfigError::Validation(format!(
                "link.endpoint must start with http:// or https://, got: '{endpoint}'"
            )));
        }

        // The query string is appended verbatim
        if endpoint.contains('?') || endpoint.contains('#') {
            return Err(ConfigError::Validation(format!(
                "link.endpoint must not contain a query or fragment, got: '{endpoint}'"
            )));
        }

        if self.keys.private_key_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "keys.private_key_path cannot be empty".into(),
            ));
        }

        if self.keys.public_key_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "keys.public_key_path cannot be empty".into(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("logging.level cannot be empty".into()));
        }

        Ok(())
    }
}
