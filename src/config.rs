//! Configuration module for loading and parsing TOML configuration files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Bearer token configuration.
    pub auth: AuthConfig,
    /// Users present at startup.
    pub users: Vec<SeedUser>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Bearer token configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token accepted on protected routes. Any non-empty token is accepted
    /// when unset.
    pub token: Option<String>,
}

/// A user created at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    /// Display name.
    pub name: String,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed or fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `HOST` and `PORT` environment overrides.
    ///
    /// # Errors
    /// Returns error if `PORT` is set but not a valid port number.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::InvalidValue(format!("PORT must be a valid number, got {port}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Address string the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "server host cannot be empty".to_string(),
            ));
        }

        if let Some(token) = &self.auth.token
            && token.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue(
                "auth token cannot be blank when set".to_string(),
            ));
        }

        for (index, user) in self.users.iter().enumerate() {
            if user.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "users[{index}] name cannot be blank"
                )));
            }
        }

        Ok(())
    }
}
