//! Export scope and the generated document

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder rendered for scope identifiers that were not supplied
pub const UNKNOWN_SCOPE: &str = "unknown";

/// Identifies the environment an export was taken from
///
/// All fields are optional. Supplied once per export and read-only for its
/// duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportScope {
    /// Environment identifier
    #[serde(default)]
    pub environment_id: Option<String>,

    /// Project identifier
    #[serde(default)]
    pub project_id: Option<String>,

    /// Organization identifier
    #[serde(default)]
    pub organization_id: Option<String>,
}

impl ExportScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Set environment
    pub fn with_environment(mut self, environment_id: impl Into<String>) -> Self {
        self.environment_id = Some(environment_id.into());
        self
    }

    /// Set project
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set organization
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Fill every missing field from `defaults`
    pub fn or(self, defaults: &ExportScope) -> Self {
        Self {
            environment_id: self.environment_id.or_else(|| defaults.environment_id.clone()),
            project_id: self.project_id.or_else(|| defaults.project_id.clone()),
            organization_id: self
                .organization_id
                .or_else(|| defaults.organization_id.clone()),
        }
    }

    /// Environment as rendered in the document header
    pub fn environment_label(&self) -> &str {
        display_or_unknown(&self.environment_id)
    }

    /// Project as rendered in the document header
    pub fn project_label(&self) -> &str {
        display_or_unknown(&self.project_id)
    }

    /// Organization as rendered in the document header
    pub fn organization_label(&self) -> &str {
        display_or_unknown(&self.organization_id)
    }
}

fn display_or_unknown(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_SCOPE,
    }
}

/// A fully rendered configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    /// Document text
    pub text: String,
}

impl GeneratedDocument {
    /// Wrap rendered text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Hex-encoded SHA-256 of the document text
    ///
    /// Two exports of identical state yield identical digests.
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }

    /// Document text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for GeneratedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
