//! `permitio_role` blocks, top-level and resource-scoped

use super::{non_empty, render_section, ExportStage, Generator, GeneratorContext, RESOURCE_TYPE, ROLE_TYPE};
use crate::error::ExportError;
use crate::hcl::HclWriter;
use permit_export_state::Role;
use std::collections::BTreeSet;

pub struct RoleGenerator {
    context: GeneratorContext,
}

/// A `resource:action` permission, split
struct Permission<'a> {
    resource: &'a str,
    action: &'a str,
}

fn parse_permission(permission: &str) -> Option<Permission<'_>> {
    let (resource, action) = permission.split_once(':')?;
    let (resource, action) = (resource.trim(), action.trim());
    if resource.is_empty() || action.is_empty() || action.contains(':') {
        return None;
    }
    Some(Permission { resource, action })
}

/// Registry key of a role; scoped roles are qualified by their resource
pub(crate) fn role_key(role: &str, resource: Option<&str>) -> String {
    match resource {
        Some(resource) => format!("{}:{}", resource, role),
        None => role.to_string(),
    }
}

/// Label of a role block; scoped roles are prefixed with their resource
fn role_label(role: &str, resource: Option<&str>) -> String {
    match resource {
        Some(resource) => format!("{}_{}", resource, role),
        None => role.to_string(),
    }
}

impl RoleGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }

    /// `None` when the role's own resource was not exported
    fn render(&self, role: &Role) -> Option<String> {
        let warnings = &self.context.warnings;
        let labels = &self.context.labels;
        let scope = non_empty(&role.resource);

        let mut depends_on = BTreeSet::new();
        if let Some(resource) = scope {
            let Some(resource_ref) = labels.resolve(RESOURCE_TYPE, resource) else {
                warnings.add(format!(
                    "Role '{}' is scoped to resource '{}', which is not exported; the role was skipped",
                    role.key, resource
                ));
                return None;
            };
            depends_on.insert(resource_ref);
        }

        let mut permissions = Vec::new();
        for raw in &role.permissions {
            let Some(permission) = parse_permission(raw) else {
                warnings.add(format!(
                    "Role '{}': permission '{}' is not of the form resource:action and was dropped",
                    role.key, raw
                ));
                continue;
            };

            match scope {
                // Scoped roles grant actions on their own resource only
                Some(resource) if permission.resource != resource => {
                    warnings.add(format!(
                        "Role '{}' on '{}': permission '{}' targets another resource and was dropped",
                        role.key, resource, raw
                    ));
                }
                Some(_) => permissions.push(permission.action.to_string()),
                None if permission.resource.starts_with("__") => {
                    permissions.push(format!("{}:{}", permission.resource, permission.action));
                }
                None => match labels.resolve(RESOURCE_TYPE, permission.resource) {
                    Some(resource_ref) => {
                        permissions.push(format!("{}:{}", permission.resource, permission.action));
                        depends_on.insert(resource_ref);
                    }
                    None => warnings.add(format!(
                        "Role '{}': permission '{}' references resource '{}', which is not exported; the permission was dropped",
                        role.key, raw, permission.resource
                    )),
                },
            }
        }

        let label = labels.allocate_as(
            ROLE_TYPE,
            &role_key(&role.key, scope),
            &role_label(&role.key, scope),
            warnings,
        );

        let mut w = HclWriter::new();
        w.open_resource(ROLE_TYPE, &label);
        w.string("key", &role.key);
        w.string("name", &role.name);
        w.optional_string("description", non_empty(&role.description));
        if let Some(resource) = scope {
            w.string("resource", resource);
        }
        w.string_list("permissions", &permissions);
        if !role.extends.is_empty() {
            w.string_list("extends", &role.extends);
        }
        let depends_on: Vec<String> = depends_on.into_iter().collect();
        w.expr_list("depends_on", &depends_on);
        w.close();
        Some(w.finish())
    }
}

#[async_trait::async_trait]
impl Generator for RoleGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::Roles
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut roles = self
            .context
            .client
            .list_roles()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;

        // Top-level roles first, then scoped roles grouped by resource
        roles.sort_by(|a, b| {
            (non_empty(&a.resource), &a.key).cmp(&(non_empty(&b.resource), &b.key))
        });

        tracing::debug!(count = roles.len(), "Fetched roles");

        let blocks = roles.iter().filter_map(|role| self.render(role)).collect();

        Ok(render_section(self.stage(), blocks))
    }
}
