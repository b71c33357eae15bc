//! `permitio_user_set` blocks

use super::resource_set::{conditions_expr, has_conditions};
use super::{non_empty, render_section, ExportStage, Generator, GeneratorContext, USER_SET_TYPE};
use crate::error::ExportError;
use crate::hcl::HclWriter;

pub struct UserSetGenerator {
    context: GeneratorContext,
}

impl UserSetGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }
}

#[async_trait::async_trait]
impl Generator for UserSetGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::UserSets
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut sets = self
            .context
            .client
            .list_user_sets()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        sets.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(count = sets.len(), "Fetched user sets");

        let mut blocks = Vec::new();

        for set in &sets {
            if !has_conditions(set.conditions.as_ref()) {
                self.context.warnings.add(format!(
                    "User set '{}' has no conditions; exported with an empty condition",
                    set.key
                ));
            }

            let label = self
                .context
                .labels
                .allocate(USER_SET_TYPE, &set.key, &self.context.warnings);
            let mut w = HclWriter::new();
            w.open_resource(USER_SET_TYPE, &label);
            w.string("key", &set.key);
            w.string("name", &set.name);
            w.optional_string("description", non_empty(&set.description));
            w.expr("conditions", &conditions_expr(set.conditions.as_ref()));
            w.close();
            blocks.push(w.finish());
        }

        Ok(render_section(self.stage(), blocks))
    }
}
