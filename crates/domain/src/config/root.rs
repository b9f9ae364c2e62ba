use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::lookup::LookupConfig;
use crate::{LookupMethod, RecordType, UpstreamAddr};

/// Main configuration structure for Ferrous Lookup
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Endpoints, timeouts and limits for lookups
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-lookup.toml in current directory
    /// 3. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-lookup.toml").exists() {
            Self::from_file("ferrous-lookup.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(server) = overrides.tcp_server {
            self.lookup.tcp_server = server;
        }
        if let Some(url) = overrides.doh_url {
            self.lookup.doh_url = url;
        }
        if let Some(record_type) = overrides.record_type {
            self.lookup.record_type = record_type;
        }
        if let Some(timeout) = overrides.request_timeout_ms {
            self.lookup.request_timeout_ms = timeout;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lookup = &self.lookup;

        if lookup.connect_timeout_ms == 0 || lookup.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        if lookup.max_response_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_response_bytes must be greater than zero".to_string(),
            ));
        }

        lookup
            .tcp_server
            .parse::<UpstreamAddr>()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if !(lookup.doh_url.starts_with("https://") || lookup.doh_url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "DoH URL must use http or https: {}",
                lookup.doh_url
            )));
        }

        lookup
            .default_method
            .parse::<LookupMethod>()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        lookup
            .record_type
            .parse::<RecordType>()
            .map_err(ConfigError::Validation)?;

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub tcp_server: Option<String>,
    pub doh_url: Option<String>,
    pub record_type: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}
