//! `permitio_user_attribute` blocks

use super::{non_empty, render_section, ExportStage, Generator, GeneratorContext, USER_ATTRIBUTE_TYPE};
use crate::error::ExportError;
use crate::hcl::HclWriter;
use permit_export_core::CanonicalType;

pub struct UserAttributesGenerator {
    context: GeneratorContext,
}

impl UserAttributesGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }
}

#[async_trait::async_trait]
impl Generator for UserAttributesGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::UserAttributes
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut attributes = self
            .context
            .client
            .list_user_attributes()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        attributes.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(count = attributes.len(), "Fetched user attributes");

        let mut blocks = Vec::new();

        for attribute in &attributes {
            let attribute_type = match attribute.attribute_type.parse::<CanonicalType>() {
                Ok(t) => t,
                Err(err) => {
                    self.context.warnings.add(format!(
                        "User attribute '{}' skipped: {}",
                        attribute.key, err
                    ));
                    continue;
                }
            };

            let label = self
                .context
                .labels
                .allocate(USER_ATTRIBUTE_TYPE, &attribute.key, &self.context.warnings);
            let mut w = HclWriter::new();
            w.open_resource(USER_ATTRIBUTE_TYPE, &label);
            w.string("key", &attribute.key);
            w.string("type", attribute_type.as_str());
            w.optional_string("description", non_empty(&attribute.description));
            w.close();
            blocks.push(w.finish());
        }

        Ok(render_section(self.stage(), blocks))
    }
}
