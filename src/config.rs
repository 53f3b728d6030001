//! Configuration loading and management.
//!
//! One TOML file configures the server identity, onboarding limits, the
//! banned-name list, the database path, and message-catalog overrides.
//! Every field has a serde default so a minimal config is a valid config.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Names (case-insensitive) that may never be chosen for a new account.
    #[serde(default)]
    pub badnames: Vec<String>,
    /// Message-catalog overrides, keyed by catalog key.
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "defaults::server_name")]
    pub name: String,
    /// Address the TCP listener binds to.
    #[serde(default = "defaults::listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Failed password attempts before the session is reset and closed.
    #[serde(default = "defaults::max_password_attempts")]
    pub max_password_attempts: u32,
    /// Maximum accepted name length in characters.
    #[serde(default = "defaults::max_name_len")]
    pub max_name_len: usize,
    /// Characters a player name may consist of.
    #[serde(default = "defaults::name_chars")]
    pub name_chars: String,
    /// Characters a surname may never contain.
    #[serde(default = "defaults::surname_reserved")]
    pub surname_reserved: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "defaults::db_path")]
    pub path: String,
}

mod defaults {
    pub fn server_name() -> String {
        "Mudlark".to_string()
    }

    pub fn listen() -> String {
        "0.0.0.0:4000".to_string()
    }

    pub fn max_password_attempts() -> u32 {
        3
    }

    pub fn max_name_len() -> usize {
        20
    }

    pub fn name_chars() -> String {
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz".to_string()
    }

    pub fn surname_reserved() -> String {
        "!\"#$%&'()*+,./:;<=>?@[\\]^`{|}~".to_string()
    }

    pub fn db_path() -> String {
        "mudlark.db".to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: defaults::server_name(),
            listen: defaults::listen(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_password_attempts: defaults::max_password_attempts(),
            max_name_len: defaults::max_name_len(),
            name_chars: defaults::name_chars(),
            surname_reserved: defaults::surname_reserved(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::db_path(),
        }
    }
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML string (used by tests).
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_password_attempts == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_password_attempts must be at least 1".into(),
            ));
        }
        if self.limits.max_name_len == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_name_len must be at least 1".into(),
            ));
        }
        if self.limits.name_chars.is_empty() {
            return Err(ConfigError::Invalid("limits.name_chars is empty".into()));
        }
        if self.server.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.listen is not a socket address: {}",
                self.server.listen
            )));
        }
        Ok(())
    }
}
