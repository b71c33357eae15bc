//! `permitio_relation` blocks

use super::{non_empty, render_section, ExportStage, Generator, GeneratorContext, RELATION_TYPE, RESOURCE_TYPE};
use crate::error::ExportError;
use crate::hcl::HclWriter;

pub struct RelationGenerator {
    context: GeneratorContext,
}

impl RelationGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }
}

#[async_trait::async_trait]
impl Generator for RelationGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::Relations
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut relations = self
            .context
            .client
            .list_relations()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        relations.sort_by(|a, b| {
            (&a.key, &a.subject_resource, &a.object_resource).cmp(&(
                &b.key,
                &b.subject_resource,
                &b.object_resource,
            ))
        });

        tracing::debug!(count = relations.len(), "Fetched relations");

        let labels = &self.context.labels;
        let mut blocks = Vec::new();

        for relation in &relations {
            let (Some(subject), Some(object)) = (
                non_empty(&relation.subject_resource),
                non_empty(&relation.object_resource),
            ) else {
                self.context.warnings.add(format!(
                    "Relation '{}' is missing its subject or object resource and was skipped",
                    relation.key
                ));
                continue;
            };

            let (Some(subject_ref), Some(object_ref)) = (
                labels.resolve(RESOURCE_TYPE, subject),
                labels.resolve(RESOURCE_TYPE, object),
            ) else {
                let missing: Vec<&str> = [subject, object]
                    .into_iter()
                    .filter(|key| labels.resolve(RESOURCE_TYPE, key).is_none())
                    .collect();
                self.context.warnings.add(format!(
                    "Relation '{}' references resource '{}', which is not exported; the relation was skipped",
                    relation.key,
                    missing.join("', '")
                ));
                continue;
            };

            let label_key = format!("{}_{}_{}", subject, relation.key, object);
            let label = labels.allocate(RELATION_TYPE, &label_key, &self.context.warnings);

            let mut w = HclWriter::new();
            w.open_resource(RELATION_TYPE, &label);
            w.string("key", &relation.key);
            w.string("name", &relation.name);
            w.optional_string("description", non_empty(&relation.description));
            w.expr("subject_resource", &format!("{}.key", subject_ref));
            w.expr("object_resource", &format!("{}.key", object_ref));
            let mut depends_on = vec![subject_ref, object_ref];
            depends_on.dedup();
            w.expr_list("depends_on", &depends_on);
            w.close();
            blocks.push(w.finish());
        }

        Ok(render_section(self.stage(), blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_export_core::WarningCollector;
    use permit_export_state::{Relation, SnapshotClient};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn relation(key: &str, subject: Option<&str>, object: Option<&str>) -> Relation {
        Relation {
            key: key.to_string(),
            name: key.to_string(),
            description: None,
            subject_resource: subject.map(str::to_string),
            object_resource: object.map(str::to_string),
        }
    }

    /// Generator over `client`, as if `resources` had been exported already
    fn generator(client: SnapshotClient, resources: &[&str]) -> (RelationGenerator, WarningCollector) {
        let warnings = WarningCollector::new();
        let context = GeneratorContext::new(Arc::new(client), warnings.clone());
        for resource in resources {
            context.labels.allocate(RESOURCE_TYPE, resource, &warnings);
        }
        (RelationGenerator::new(context), warnings)
    }

    #[tokio::test]
    async fn renders_relation_with_references() {
        let client = SnapshotClient::builder()
            .with_relation(relation("parent", Some("folder"), Some("document")))
            .build();
        let (generator, warnings) = generator(client, &["document", "folder"]);

        assert_eq!(
            generator.generate_hcl().await.unwrap().unwrap(),
            "\n# Relations\n\
             resource \"permitio_relation\" \"folder_parent_document\" {\n\
             \x20 key = \"parent\"\n\
             \x20 name = \"parent\"\n\
             \x20 subject_resource = permitio_resource.folder.key\n\
             \x20 object_resource = permitio_resource.document.key\n\
             \x20 depends_on = [permitio_resource.folder, permitio_resource.document]\n\
             }\n"
        );
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn incomplete_relations_are_skipped() {
        let client = SnapshotClient::builder()
            .with_relation(relation("owner", None, Some("document")))
            .with_relation(relation("member", Some("team"), Some("")))
            .build();
        let (generator, warnings) = generator(client, &["document", "team"]);

        assert_eq!(generator.generate_hcl().await.unwrap(), None);
        assert_eq!(
            warnings.warnings(),
            vec![
                "Relation 'member' is missing its subject or object resource and was skipped",
                "Relation 'owner' is missing its subject or object resource and was skipped",
            ]
        );
    }

    #[tokio::test]
    async fn relations_to_unexported_resources_are_skipped() {
        let client = SnapshotClient::builder()
            .with_relation(relation("parent", Some("ghost"), Some("document")))
            .with_relation(relation("owner", Some("team"), Some("document")))
            .build();
        let (generator, warnings) = generator(client, &["document", "team"]);

        let hcl = generator.generate_hcl().await.unwrap().unwrap();
        assert!(hcl.contains("\"permitio_relation\" \"team_owner_document\""));
        assert!(!hcl.contains("ghost"));
        assert_eq!(
            warnings.warnings(),
            vec!["Relation 'parent' references resource 'ghost', which is not exported; the relation was skipped"]
        );
    }
}
