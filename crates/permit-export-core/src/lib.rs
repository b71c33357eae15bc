//! Permit export core
//!
//! Canonical resource model shared by live-state export and schema import,
//! plus the export scope, warning collector and configuration.

pub mod config;
pub mod document;
pub mod resource;
pub mod warning;

pub use config::{
    Config, ConfigError, MapperConfig, ProviderConfig, DEFAULT_API_URL, DEFAULT_MAPPER_DOMAIN,
    DEFAULT_PROVIDER_SOURCE, DEFAULT_PROVIDER_VERSION,
};
pub use document::{ExportScope, GeneratedDocument, UNKNOWN_SCOPE};
pub use resource::{AttributeSpec, CanonicalType, ResourceDefinition, UnknownTypeError, NULLABLE_DESCRIPTION};
pub use warning::WarningCollector;
