//! Configuration schema (permit-export.toml)

use crate::document::ExportScope;
use serde::{Deserialize, Serialize};

/// Default Permit API endpoint written into the provider block
pub const DEFAULT_API_URL: &str = "https://api.permit.io";

/// Default Terraform registry source for the provider
pub const DEFAULT_PROVIDER_SOURCE: &str = "registry.terraform.io/permitio/permit-io";

/// Default provider version constraint
pub const DEFAULT_PROVIDER_VERSION: &str = "~> 0.0.14";

/// Default key prefix for resources mapped from a foreign schema
pub const DEFAULT_MAPPER_DOMAIN: &str = "trino";

/// Terraform provider declaration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registry source address
    #[serde(default = "default_provider_source")]
    pub source: String,

    /// Version constraint
    #[serde(default = "default_provider_version")]
    pub version: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            source: default_provider_source(),
            version: default_provider_version(),
        }
    }
}

/// Schema import settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Prefix for every generated resource key (e.g. `trino`)
    #[serde(default = "default_mapper_domain")]
    pub domain: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            domain: default_mapper_domain(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Permit API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Provider declaration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Scope defaults, used for identifiers not given on the command line
    #[serde(default)]
    pub scope: ExportScope,

    /// Schema import settings
    #[serde(default)]
    pub mapper: MapperConfig,

    /// Directory containing the config file (for resolving relative paths)
    #[serde(skip)]
    pub project_root: std::path::PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            provider: ProviderConfig::default(),
            scope: ExportScope::default(),
            mapper: MapperConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Reject values that would produce an unusable document
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".to_string()));
        }
        if self.provider.source.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "provider.source must not be empty".to_string(),
            ));
        }
        let domain = &self.mapper.domain;
        if domain.is_empty()
            || !domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Invalid(format!(
                "mapper.domain '{}' must be a non-empty slug",
                domain
            )));
        }
        Ok(())
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_provider_source() -> String {
    DEFAULT_PROVIDER_SOURCE.to_string()
}

fn default_provider_version() -> String {
    DEFAULT_PROVIDER_VERSION.to_string()
}

fn default_mapper_domain() -> String {
    DEFAULT_MAPPER_DOMAIN.to_string()
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.provider.version, DEFAULT_PROVIDER_VERSION);
        assert_eq!(config.mapper.domain, "trino");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [scope]
            environment_id = "env-1"

            [mapper]
            domain = "warehouse"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.scope.environment_id.as_deref(), Some("env-1"));
        assert_eq!(config.scope.project_id, None);
        assert_eq!(config.mapper.domain, "warehouse");
    }

    #[test]
    fn invalid_domain_is_rejected() {
        let result = Config::from_toml("[mapper]\ndomain = \"has space\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.api_url, parsed.api_url);
        assert_eq!(config.provider, parsed.provider);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permit-export.toml");

        let mut config = Config::default();
        config.api_url = "https://api.eu.permit.io".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.api_url, "https://api.eu.permit.io");
        assert_eq!(loaded.project_root, dir.path());
    }
}
