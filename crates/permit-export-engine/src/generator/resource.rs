//! `permitio_resource` blocks

use super::{non_empty, render_section, ExportStage, Generator, GeneratorContext, RESOURCE_TYPE};
use crate::error::ExportError;
use crate::hcl::{HclWriter, LabelRegistry};
use permit_export_core::{AttributeSpec, CanonicalType, ResourceDefinition, WarningCollector};
use permit_export_state::Resource;
use std::collections::BTreeMap;

pub struct ResourceGenerator {
    context: GeneratorContext,
}

impl ResourceGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }

    /// Canonical form of a live resource, plus display names of its actions
    ///
    /// `None` when the resource cannot be rendered at all.
    fn convert(&self, resource: &Resource) -> Option<(ResourceDefinition, BTreeMap<String, String>)> {
        let warnings = &self.context.warnings;

        if resource.actions.is_empty() {
            warnings.add(format!(
                "Resource '{}' has no actions and was skipped",
                resource.key
            ));
            return None;
        }

        let mut attributes = BTreeMap::new();
        for (name, attribute) in &resource.attributes {
            match attribute.attribute_type.parse::<CanonicalType>() {
                Ok(attribute_type) => {
                    let mut spec = AttributeSpec::new(attribute_type);
                    if let Some(description) = non_empty(&attribute.description) {
                        spec = spec.with_description(description);
                    }
                    attributes.insert(name.clone(), spec);
                }
                Err(err) => warnings.add(format!(
                    "Attribute '{}' of resource '{}' dropped: {}",
                    name, resource.key, err
                )),
            }
        }

        let mut definition =
            ResourceDefinition::new(&resource.key, &resource.name, resource.actions.keys().cloned())
                .with_attributes(attributes);
        if let Some(description) = non_empty(&resource.description) {
            definition = definition.with_description(description);
        }

        let action_names = resource
            .actions
            .iter()
            .filter_map(|(key, action)| {
                non_empty(&action.name).map(|name| (key.clone(), name.to_string()))
            })
            .collect();

        Some((definition, action_names))
    }
}

#[async_trait::async_trait]
impl Generator for ResourceGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::Resources
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut resources = self
            .context
            .client
            .list_resources()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        resources.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(count = resources.len(), "Fetched resources");

        let mut blocks = Vec::new();

        // Skipped resources are never registered, so references to them fail to resolve
        for resource in resources.iter().filter(|r| !r.is_reserved()) {
            let Some((definition, action_names)) = self.convert(resource) else {
                continue;
            };
            let label = self
                .context
                .labels
                .allocate(RESOURCE_TYPE, &definition.key, &self.context.warnings);
            blocks.push(write_resource(&label, &definition, &action_names));
        }

        Ok(render_section(self.stage(), blocks))
    }
}

/// Render one resource definition as a `permitio_resource` block
pub fn render_resource(label: &str, definition: &ResourceDefinition) -> String {
    write_resource(label, definition, &BTreeMap::new())
}

/// Render resource definitions in order, one block each
///
/// Blocks are separated by blank lines. Label collisions are reported to
/// `warnings`.
pub fn render_resources(definitions: &[ResourceDefinition], warnings: &WarningCollector) -> String {
    let labels = LabelRegistry::new();
    definitions
        .iter()
        .map(|definition| {
            let label = labels.allocate(RESOURCE_TYPE, &definition.key, warnings);
            render_resource(&label, definition)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_resource(
    label: &str,
    definition: &ResourceDefinition,
    action_names: &BTreeMap<String, String>,
) -> String {
    let mut w = HclWriter::new();
    w.open_resource(RESOURCE_TYPE, label);
    w.string("key", &definition.key);
    w.string("name", &definition.name);
    w.optional_string("description", definition.description.as_deref());

    w.open_map("actions");
    for action in &definition.actions {
        w.open_map_entry(action);
        w.string("name", action_names.get(action).unwrap_or(action));
        w.close();
    }
    w.close();

    if !definition.attributes.is_empty() {
        w.open_map("attributes");
        for (name, spec) in &definition.attributes {
            w.open_map_entry(name);
            w.string("type", spec.attribute_type.as_str());
            w.optional_string("description", spec.description.as_deref());
            w.close();
        }
        w.close();
    }

    w.close();
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_export_state::{ActionBlock, AttributeBlock, FetchError, SnapshotClient, StateCategory};
    use std::sync::Arc;

    fn generator(client: SnapshotClient) -> (ResourceGenerator, WarningCollector) {
        let warnings = WarningCollector::new();
        let context = GeneratorContext::new(Arc::new(client), warnings.clone());
        (ResourceGenerator::new(context), warnings)
    }

    #[test]
    fn renders_definition() {
        let definition = ResourceDefinition::new("trino-table-c-s-t", "c.s.t", ["SelectFromTable"])
            .with_attribute("id", AttributeSpec::new(CanonicalType::Number))
            .with_attribute("note", AttributeSpec::from_column(CanonicalType::String, true));

        assert_eq!(
            render_resource("trino-table-c-s-t", &definition),
            "resource \"permitio_resource\" \"trino-table-c-s-t\" {\n\
             \x20 key = \"trino-table-c-s-t\"\n\
             \x20 name = \"c.s.t\"\n\
             \x20 actions = {\n\
             \x20   \"SelectFromTable\" = {\n\
             \x20     name = \"SelectFromTable\"\n\
             \x20   }\n\
             \x20 }\n\
             \x20 attributes = {\n\
             \x20   \"id\" = {\n\
             \x20     type = \"number\"\n\
             \x20   }\n\
             \x20   \"note\" = {\n\
             \x20     type = \"string\"\n\
             \x20     description = \"nullable\"\n\
             \x20   }\n\
             \x20 }\n\
             }\n"
        );
    }

    #[tokio::test]
    async fn skips_reserved_and_actionless_resources() {
        let client = SnapshotClient::builder()
            .with_resource(Resource::new("__user", "User").with_action("read"))
            .with_resource(Resource::new("folder", "Folder"))
            .with_resource(Resource::new("document", "Document").with_action("read"))
            .build();
        let (generator, warnings) = generator(client);

        let hcl = generator.generate_hcl().await.unwrap().unwrap();
        assert!(hcl.starts_with("\n# Resources\n"));
        assert!(hcl.contains("\"permitio_resource\" \"document\""));
        assert!(!hcl.contains("__user"));
        assert!(!hcl.contains("folder"));
        assert_eq!(
            warnings.warnings(),
            vec!["Resource 'folder' has no actions and was skipped"]
        );
    }

    #[tokio::test]
    async fn drops_unknown_attribute_types() {
        let mut resource = Resource::new("document", "Document")
            .with_attribute("owner", AttributeBlock::new("string"))
            .with_attribute("shape", AttributeBlock::new("polygon"));
        resource.actions.insert(
            "read".to_string(),
            ActionBlock {
                name: Some("Read".to_string()),
                description: None,
            },
        );
        let (generator, warnings) = generator(SnapshotClient::builder().with_resource(resource).build());

        let hcl = generator.generate_hcl().await.unwrap().unwrap();
        assert!(hcl.contains("\"owner\" = {"));
        assert!(!hcl.contains("shape"));
        assert!(hcl.contains("name = \"Read\""));
        assert_eq!(warnings.len(), 1);
        assert!(warnings.warnings()[0].contains("'shape'"));
    }

    #[tokio::test]
    async fn registers_labels_for_later_stages() {
        let client = SnapshotClient::builder()
            .with_resource(Resource::new("doc_v2", "Doc v2").with_action("read"))
            .with_resource(Resource::new("doc.v2", "Doc.v2").with_action("read"))
            .with_resource(Resource::new("draft", "Draft"))
            .build();
        let warnings = WarningCollector::new();
        let context = GeneratorContext::new(Arc::new(client), warnings.clone());
        ResourceGenerator::new(context.clone()).generate_hcl().await.unwrap();

        assert_eq!(
            context.labels.resolve(RESOURCE_TYPE, "doc.v2").as_deref(),
            Some("permitio_resource.doc_v2")
        );
        assert_eq!(
            context.labels.resolve(RESOURCE_TYPE, "doc_v2").as_deref(),
            Some("permitio_resource.doc_v2_2")
        );
        assert_eq!(context.labels.resolve(RESOURCE_TYPE, "draft"), None);
        assert_eq!(warnings.len(), 2);
    }

    #[tokio::test]
    async fn sorts_by_key() {
        let client = SnapshotClient::builder()
            .with_resource(Resource::new("zeta", "Zeta").with_action("read"))
            .with_resource(Resource::new("alpha", "Alpha").with_action("read"))
            .build();
        let (generator, _) = generator(client);

        let hcl = generator.generate_hcl().await.unwrap().unwrap();
        let alpha = hcl.find("\"alpha\"").unwrap();
        let zeta = hcl.find("\"zeta\"").unwrap();
        assert!(alpha < zeta);
    }

    #[tokio::test]
    async fn empty_category_renders_nothing() {
        let (generator, warnings) = generator(SnapshotClient::empty());
        assert_eq!(generator.generate_hcl().await.unwrap(), None);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_attributed_to_stage() {
        let error = FetchError::AuthenticationError("bad key".to_string());
        let client = SnapshotClient::builder()
            .with_error(StateCategory::Resources, error.clone())
            .build();
        let (generator, _) = generator(client);

        assert_eq!(
            generator.generate_hcl().await,
            Err(ExportError::fetch(ExportStage::Resources, error))
        );
    }
}
