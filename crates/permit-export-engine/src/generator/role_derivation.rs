//! `permitio_role_derivation` blocks

use super::role::role_key;
use super::{render_section, ExportStage, Generator, GeneratorContext, ROLE_DERIVATION_TYPE, ROLE_TYPE};
use crate::error::ExportError;
use crate::hcl::HclWriter;
use permit_export_state::RoleDerivation;

pub struct RoleDerivationGenerator {
    context: GeneratorContext,
}

impl RoleDerivationGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }
}

fn sort_key(d: &RoleDerivation) -> (&str, &str, &str, &str, &str) {
    (
        d.resource.as_str(),
        d.role.as_str(),
        d.linked_by.as_str(),
        d.on_resource.as_str(),
        d.to_role.as_str(),
    )
}

#[async_trait::async_trait]
impl Generator for RoleDerivationGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::RoleDerivations
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut derivations = self
            .context
            .client
            .list_role_derivations()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        derivations.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        tracing::debug!(count = derivations.len(), "Fetched role derivations");

        let labels = &self.context.labels;
        let mut blocks = Vec::new();

        for derivation in &derivations {
            let missing = derivation.missing_fields();
            if !missing.is_empty() {
                self.context.warnings.add(format!(
                    "Role derivation for role '{}' on '{}' is missing {} and was skipped",
                    derivation.role,
                    derivation.resource,
                    missing.join(", ")
                ));
                continue;
            }

            // Both ends of a derivation are resource roles
            let role = role_key(&derivation.role, Some(derivation.resource.as_str()));
            let to_role = role_key(&derivation.to_role, Some(derivation.on_resource.as_str()));
            let (role_ref, to_role_ref) =
                match (labels.resolve(ROLE_TYPE, &role), labels.resolve(ROLE_TYPE, &to_role)) {
                    (Some(role_ref), Some(to_role_ref)) => (role_ref, to_role_ref),
                    (role_ref, to_role_ref) => {
                        let missing: Vec<String> = [(role, role_ref), (to_role, to_role_ref)]
                            .into_iter()
                            .filter(|(_, reference)| reference.is_none())
                            .map(|(key, _)| format!("'{}'", key))
                            .collect();
                        self.context.warnings.add(format!(
                            "Role derivation for role '{}' on '{}' references role {}, which is not exported; the derivation was skipped",
                            derivation.role,
                            derivation.resource,
                            missing.join(" and ")
                        ));
                        continue;
                    }
                };

            let label_key = format!(
                "{}_{}_{}_{}_{}",
                derivation.resource,
                derivation.role,
                derivation.linked_by,
                derivation.on_resource,
                derivation.to_role
            );
            let label = labels.allocate(ROLE_DERIVATION_TYPE, &label_key, &self.context.warnings);

            let mut w = HclWriter::new();
            w.open_resource(ROLE_DERIVATION_TYPE, &label);
            w.string("role", &derivation.role);
            w.string("on_resource", &derivation.on_resource);
            w.string("to_role", &derivation.to_role);
            w.string("resource", &derivation.resource);
            w.string("linked_by", &derivation.linked_by);
            let mut depends_on = vec![role_ref, to_role_ref];
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
    use permit_export_state::SnapshotClient;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Generator over `client`, as if the `(resource, role)` pairs had been exported already
    fn generator(client: SnapshotClient, roles: &[(&str, &str)]) -> (RoleDerivationGenerator, WarningCollector) {
        let warnings = WarningCollector::new();
        let context = GeneratorContext::new(Arc::new(client), warnings.clone());
        for &(resource, role) in roles {
            let label = format!("{}_{}", resource, role);
            context
                .labels
                .allocate_as(ROLE_TYPE, &role_key(role, Some(resource)), &label, &warnings);
        }
        (RoleDerivationGenerator::new(context), warnings)
    }

    fn derivation(resource: &str, role: &str, on_resource: &str, to_role: &str) -> RoleDerivation {
        RoleDerivation {
            role: role.to_string(),
            on_resource: on_resource.to_string(),
            to_role: to_role.to_string(),
            resource: resource.to_string(),
            linked_by: "parent".to_string(),
        }
    }

    #[tokio::test]
    async fn renders_complete_derivation() {
        let client = SnapshotClient::builder()
            .with_role_derivation(derivation("document", "editor", "folder", "editor"))
            .build();
        let (generator, warnings) = generator(client, &[("document", "editor"), ("folder", "editor")]);

        assert_eq!(
            generator.generate_hcl().await.unwrap().unwrap(),
            "\n# Role Derivations\n\
             resource \"permitio_role_derivation\" \"document_editor_parent_folder_editor\" {\n\
             \x20 role = \"editor\"\n\
             \x20 on_resource = \"folder\"\n\
             \x20 to_role = \"editor\"\n\
             \x20 resource = \"document\"\n\
             \x20 linked_by = \"parent\"\n\
             \x20 depends_on = [permitio_role.document_editor, permitio_role.folder_editor]\n\
             }\n"
        );
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn incomplete_derivations_are_skipped() {
        let client = SnapshotClient::builder()
            .with_role_derivation(RoleDerivation {
                role: "viewer".to_string(),
                resource: "document".to_string(),
                ..Default::default()
            })
            .build();
        let (generator, warnings) = generator(client, &[]);

        assert_eq!(generator.generate_hcl().await.unwrap(), None);
        assert_eq!(
            warnings.warnings(),
            vec!["Role derivation for role 'viewer' on 'document' is missing on_resource, to_role, linked_by and was skipped"]
        );
    }

    #[tokio::test]
    async fn derivations_to_unexported_roles_are_skipped() {
        let client = SnapshotClient::builder()
            .with_role_derivation(derivation("document", "editor", "ghost", "owner"))
            .build();
        let (generator, warnings) = generator(client, &[("document", "editor")]);

        assert_eq!(generator.generate_hcl().await.unwrap(), None);
        assert_eq!(
            warnings.warnings(),
            vec!["Role derivation for role 'editor' on 'document' references role 'ghost:owner', which is not exported; the derivation was skipped"]
        );
    }
}
