//! Sources of foreign schema metadata
//!
//! The mapper itself never performs I/O; callers fetch a [`ForeignSchema`]
//! from a source first and map it afterwards.

use crate::schema::ForeignSchema;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading foreign schema metadata
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Invalid schema document {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Schema fetch failed: {0}")]
    Fetch(String),
}

/// Trait for anything that can produce a foreign schema tree
#[async_trait::async_trait]
pub trait ForeignSchemaSource: Send + Sync {
    /// Source name, used in logs
    fn name(&self) -> &'static str;

    /// Fetch the complete metadata tree
    async fn fetch_schema(&self) -> Result<ForeignSchema, SourceError>;
}

/// Reads a schema tree exported as JSON
///
/// The document has the engine's field names (`catalogs`, `schemas`,
/// `tables`, `functions`, `views`, `materializedViews`, `procedures`);
/// absent categories are treated as empty.
#[derive(Debug, Clone)]
pub struct JsonSchemaSource {
    path: PathBuf,
}

impl JsonSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a schema document held in memory
    pub fn parse(path: &Path, contents: &str) -> Result<ForeignSchema, SourceError> {
        serde_json::from_str(contents).map_err(|e| SourceError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ForeignSchemaSource for JsonSchemaSource {
    fn name(&self) -> &'static str {
        "JSON file"
    }

    async fn fetch_schema(&self) -> Result<ForeignSchema, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let schema = Self::parse(&self.path, &contents)?;
        tracing::info!(
            path = %self.path.display(),
            catalogs = schema.catalogs.len(),
            tables = schema.tables.len(),
            "Loaded foreign schema"
        );
        Ok(schema)
    }
}

/// In-memory source returning a fixed schema
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaSource {
    schema: ForeignSchema,
}

impl StaticSchemaSource {
    pub fn new(schema: ForeignSchema) -> Self {
        Self { schema }
    }
}

#[async_trait::async_trait]
impl ForeignSchemaSource for StaticSchemaSource {
    fn name(&self) -> &'static str {
        "Static"
    }

    async fn fetch_schema(&self) -> Result<ForeignSchema, SourceError> {
        Ok(self.schema.clone())
    }
}
