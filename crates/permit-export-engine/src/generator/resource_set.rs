//! `permitio_resource_set` blocks

use super::{
    non_empty, render_section, ExportStage, Generator, GeneratorContext, RESOURCE_SET_TYPE,
    RESOURCE_TYPE,
};
use crate::error::ExportError;
use crate::hcl::{json_expr, HclWriter, LabelRegistry};
use permit_export_state::ResourceSet;

pub struct ResourceSetGenerator {
    context: GeneratorContext,
}

impl ResourceSetGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }
}

/// `jsonencode(...)` of a condition tree; absent conditions encode as `{}`
pub(crate) fn conditions_expr(conditions: Option<&serde_json::Value>) -> String {
    match conditions {
        Some(value) if !value.is_null() => format!("jsonencode({})", json_expr(value)),
        _ => "jsonencode({})".to_string(),
    }
}

/// Reference to the resource a set is defined over, if that resource was exported
pub(crate) fn exported_resource(set: &ResourceSet, labels: &LabelRegistry) -> Option<String> {
    non_empty(&set.resource).and_then(|resource| labels.resolve(RESOURCE_TYPE, resource))
}

pub(crate) fn has_conditions(conditions: Option<&serde_json::Value>) -> bool {
    conditions.is_some_and(|value| !value.is_null())
}

#[async_trait::async_trait]
impl Generator for ResourceSetGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::ResourceSets
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut sets = self
            .context
            .client
            .list_resource_sets()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        sets.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(count = sets.len(), "Fetched resource sets");

        let labels = &self.context.labels;
        let mut blocks = Vec::new();

        for set in &sets {
            let Some(resource) = non_empty(&set.resource) else {
                self.context.warnings.add(format!(
                    "Resource set '{}' has no resource and was skipped",
                    set.key
                ));
                continue;
            };
            let Some(resource_ref) = exported_resource(set, labels) else {
                self.context.warnings.add(format!(
                    "Resource set '{}' is defined over resource '{}', which is not exported; the set was skipped",
                    set.key, resource
                ));
                continue;
            };

            if !has_conditions(set.conditions.as_ref()) {
                self.context.warnings.add(format!(
                    "Resource set '{}' has no conditions; exported with an empty condition",
                    set.key
                ));
            }

            let label = labels.allocate(RESOURCE_SET_TYPE, &set.key, &self.context.warnings);

            let mut w = HclWriter::new();
            w.open_resource(RESOURCE_SET_TYPE, &label);
            w.string("key", &set.key);
            w.string("name", &set.name);
            w.optional_string("description", non_empty(&set.description));
            w.expr("resource", &format!("{}.key", resource_ref));
            w.expr("conditions", &conditions_expr(set.conditions.as_ref()));
            w.expr_list("depends_on", &[resource_ref]);
            w.close();
            blocks.push(w.finish());
        }

        Ok(render_section(self.stage(), blocks))
    }
}
