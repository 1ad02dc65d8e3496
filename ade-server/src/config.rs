//! Server configuration, read from a TOML file.
//!
//! Every key is optional:
//!
//! ```toml
//! listen = "0.0.0.0:3000"
//! database_url = "sqlite://ade.db?mode=rwc"
//! log_level = "info,ade=debug"
//! apply_migrations = true
//!
//! [login]
//! max_attempts = 3
//! block_minutes = 15
//!
//! [objectives]
//! months_back = 3
//! months_ahead = 2
//!
//! [bootstrap_admin]
//! username = "admin"
//! password = "change-me"
//! ```
use std::{fs, net::SocketAddr, path::Path};

use ade::{LoginLimitConfig, ObjectiveWindow};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub database_url: String,
    pub log_level: String,
    pub apply_migrations: bool,
    pub login: LoginSection,
    pub objectives: ObjectivesSection,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoginSection {
    pub max_attempts: u32,
    pub block_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObjectivesSection {
    pub months_back: u32,
    pub months_ahead: u32,
}

/// Account created on startup when no user exists yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: "sqlite://ade.db?mode=rwc".to_string(),
            log_level: "info,ade=debug".to_string(),
            apply_migrations: true,
            login: LoginSection::default(),
            objectives: ObjectivesSection::default(),
            bootstrap_admin: None,
        }
    }
}

impl Default for LoginSection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            block_minutes: 15,
        }
    }
}

impl Default for ObjectivesSection {
    fn default() -> Self {
        let window = ObjectiveWindow::default();
        Self {
            months_back: window.months_back,
            months_ahead: window.months_ahead,
        }
    }
}

impl LoginSection {
    pub fn to_limits(&self) -> Result<LoginLimitConfig, ConfigError> {
        let block_duration = chrono::Duration::try_minutes(self.block_minutes)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "login.block_minutes is out of range: {}",
                    self.block_minutes
                ))
            })?;
        Ok(LoginLimitConfig {
            max_attempts: self.max_attempts,
            block_duration,
        })
    }
}

impl ObjectivesSection {
    pub fn to_window(&self) -> ObjectiveWindow {
        ObjectiveWindow {
            months_back: self.months_back,
            months_ahead: self.months_ahead,
        }
    }
}

impl ServerConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid("database_url is empty".to_string()));
        }
        if self.login.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "login.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.login.block_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "login.block_minutes must be positive".to_string(),
            ));
        }
        if self.login.block_minutes > LoginLimitConfig::MAX_BLOCK_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "login.block_minutes must not exceed {}",
                LoginLimitConfig::MAX_BLOCK_MINUTES
            )));
        }
        if let Some(admin) = &self.bootstrap_admin {
            if admin.username.trim().is_empty() || admin.password.is_empty() {
                return Err(ConfigError::Invalid(
                    "bootstrap_admin needs a username and a password".to_string(),
                ));
            }
        }
        Ok(())
    }
}
