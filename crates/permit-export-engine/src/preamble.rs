//! Document header and provider block

use crate::hcl::HclWriter;
use permit_export_core::{Config, ExportScope, DEFAULT_API_URL, DEFAULT_PROVIDER_SOURCE, DEFAULT_PROVIDER_VERSION};

/// First line of every generated document
pub const HEADER_TITLE: &str = "Generated by Permit CLI";

/// Provider settings written into the document preamble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub api_url: String,
    pub provider_source: String,
    pub provider_version: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            provider_source: DEFAULT_PROVIDER_SOURCE.to_string(),
            provider_version: DEFAULT_PROVIDER_VERSION.to_string(),
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_url: config.api_url.clone(),
            provider_source: config.provider.source.clone(),
            provider_version: config.provider.version.clone(),
        }
    }
}

/// Header comment lines naming the scope, then the provider declaration
pub fn render_preamble(api_key: &str, scope: &ExportScope, options: &ExportOptions) -> String {
    let mut w = HclWriter::new();
    w.comment(HEADER_TITLE);
    w.comment(&format!("Environment: {}", scope.environment_label()));
    w.comment(&format!("Project: {}", scope.project_label()));
    w.comment(&format!("Organization: {}", scope.organization_label()));
    w.blank_line();

    w.open_block("terraform", &[]);
    w.open_block("required_providers", &[]);
    w.open_map("permitio");
    w.string("source", &options.provider_source);
    w.string("version", &options.provider_version);
    w.close();
    w.close();
    w.close();
    w.blank_line();

    w.open_block("provider", &["permitio"]);
    w.string("api_url", &options.api_url);
    w.string("api_key", api_key);
    w.close();

    w.finish()
}
