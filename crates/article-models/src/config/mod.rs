//! Configuration for services embedding the article models
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - A `.env` file, read before the environment
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::errors::Service;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Which service is using the library
    #[serde(default)]
    pub service: ServiceSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
    /// Registered service name, snake or kebab case
    #[serde(default = "default_service_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

fn default_service_name() -> String { Service::ArticleModelsLibrary.name().to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

impl ModelsConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__LOGGING__LEVEL=debug
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Resolve the configured service name against the registry
    pub fn service(&self) -> Result<Service, ConfigError> {
        Service::from_name(&self.service.name).ok_or_else(|| {
            ConfigError::Message(format!("unknown service name: {}", self.service.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_config() {
        let config = ModelsConfig::default();
        assert_eq!(config.service.name, "article_models_library");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json_logging);
        assert_eq!(config.service().unwrap(), Service::ArticleModelsLibrary);
    }

    #[test]
    fn test_partial_source_uses_defaults() {
        let config: ModelsConfig = Config::builder()
            .add_source(File::from_str(
                "[service]\nname = \"article-search-service\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.service().unwrap(), Service::ArticleSearchService);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_service_is_rejected() {
        let mut config = ModelsConfig::default();
        config.service.name = "billing_service".to_string();
        assert!(config.service().is_err());
    }
}
