//! Admin server configuration
//!
//! Every field can be overridden from the environment; anything unset falls
//! back to [`AdminDefaults`].

use super::defaults::AdminDefaults;
use super::{AppConfigTrait, ConfigError, ConfigSource, Environment};
use crate::logging::LoggingConfig;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const ENVIRONMENT: &str = "ENVIRONMENT";
const ADMIN_HOST: &str = "ADMIN_HOST";
const ADMIN_PORT: &str = "ADMIN_PORT";
const ADMIN_API_PREFIX: &str = "ADMIN_API_PREFIX";
const ADMIN_RESOURCES_PATH: &str = "ADMIN_RESOURCES_PATH";
const ADMIN_REQUEST_TIMEOUT: &str = "ADMIN_REQUEST_TIMEOUT";
const LOG_LEVEL: &str = "LOG_LEVEL";

/// Configuration of the admin HTTP server
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Path prefix every relation route is mounted under
    pub api_prefix: String,
    /// YAML resource catalog; `None` serves an empty catalog
    pub resources_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: AdminDefaults::HOST.to_string(),
            port: AdminDefaults::PORT,
            api_prefix: AdminDefaults::API_PREFIX.to_string(),
            resources_path: None,
            request_timeout_secs: AdminDefaults::REQUEST_TIMEOUT_SECS,
            log_level: AdminDefaults::LOG_LEVEL.to_string(),
        }
    }
}

impl AdminConfig {
    /// Configuration for tests: random port, quiet logs
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            port: 0,
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_resources_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resources_path = Some(path.into());
        self
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Logging preset for the configured environment at the configured level
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::for_environment(self.environment, &self.log_level)
    }
}

impl AppConfigTrait for AdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(env_str) = env::var(ENVIRONMENT) {
            config.environment = env_str.parse()?;
        }

        if let Ok(host) = env::var(ADMIN_HOST) {
            config.host = host;
        }

        if let Ok(port_str) = env::var(ADMIN_PORT) {
            config.port = port_str
                .parse()
                .map_err(|_| ConfigError::invalid_value("port", port_str, "valid port number (0-65535)"))?;
        }

        if let Ok(prefix) = env::var(ADMIN_API_PREFIX) {
            config.api_prefix = prefix;
        }

        config.resources_path = env::var(ADMIN_RESOURCES_PATH)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        if let Ok(timeout_str) = env::var(ADMIN_REQUEST_TIMEOUT) {
            config.request_timeout_secs = timeout_str.parse().map_err(|_| {
                ConfigError::invalid_value("request_timeout_secs", timeout_str, "valid number of seconds")
            })?;
        }

        if let Ok(log_level) = env::var(LOG_LEVEL) {
            config.log_level = log_level.to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.environment.is_testing() && self.port == 0 {
            return Err(ConfigError::invalid_value(
                "port",
                self.port.to_string(),
                "port between 1 and 65535",
            ));
        }

        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(ConfigError::invalid_value(
                "api_prefix",
                self.api_prefix.as_str(),
                "a path starting with '/' and without a trailing '/'",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation_failed(
                "Request timeout must be greater than 0",
            ));
        }

        if !AdminDefaults::LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                self.log_level.as_str(),
                format!("one of: {}", AdminDefaults::LOG_LEVELS.join(", ")),
            ));
        }

        if self.environment.is_production() && self.resources_path.is_none() {
            return Err(ConfigError::missing_required(
                "resources_path",
                "ADMIN_RESOURCES_PATH is required in production",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        [
            ("environment", ENVIRONMENT, self.environment.to_string()),
            ("host", ADMIN_HOST, self.host.clone()),
            ("port", ADMIN_PORT, self.port.to_string()),
            ("api_prefix", ADMIN_API_PREFIX, self.api_prefix.clone()),
            (
                "resources_path",
                ADMIN_RESOURCES_PATH,
                self.resources_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
            ),
            (
                "request_timeout_secs",
                ADMIN_REQUEST_TIMEOUT,
                self.request_timeout_secs.to_string(),
            ),
            ("log_level", LOG_LEVEL, self.log_level.clone()),
        ]
        .into_iter()
        .map(|(field, var, value)| {
            let source = if env::var(var).is_ok() {
                ConfigSource::EnvVar(var.to_string())
            } else {
                ConfigSource::Default(value)
            };
            (field.to_string(), source)
        })
        .collect()
    }
}
