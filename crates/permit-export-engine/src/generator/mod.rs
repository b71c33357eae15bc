//! Generation stages
//!
//! Each generator reads one category of live state through a
//! [`PolicyStateClient`] and renders it as HCL. Entities that can only be
//! partially rendered are reported to the shared [`WarningCollector`];
//! only fetch failures abort. Block labels go through the shared
//! [`LabelRegistry`], which is also where cross-stage references are
//! resolved.

mod condition_set;
mod relation;
mod resource;
mod resource_set;
mod role;
mod role_derivation;
mod user_attributes;
mod user_set;

pub use condition_set::ConditionSetGenerator;
pub use relation::RelationGenerator;
pub use resource::{render_resource, render_resources, ResourceGenerator};
pub use resource_set::ResourceSetGenerator;
pub use role::RoleGenerator;
pub use role_derivation::RoleDerivationGenerator;
pub use user_attributes::UserAttributesGenerator;
pub use user_set::UserSetGenerator;

use crate::error::ExportError;
use crate::hcl::LabelRegistry;
use permit_export_core::WarningCollector;
use permit_export_state::PolicyStateClient;
use std::sync::Arc;

pub(crate) const RESOURCE_TYPE: &str = "permitio_resource";
pub(crate) const ROLE_TYPE: &str = "permitio_role";
pub(crate) const USER_ATTRIBUTE_TYPE: &str = "permitio_user_attribute";
pub(crate) const RELATION_TYPE: &str = "permitio_relation";
pub(crate) const CONDITION_SET_RULE_TYPE: &str = "permitio_condition_set_rule";
pub(crate) const RESOURCE_SET_TYPE: &str = "permitio_resource_set";
pub(crate) const USER_SET_TYPE: &str = "permitio_user_set";
pub(crate) const ROLE_DERIVATION_TYPE: &str = "permitio_role_derivation";

/// One generation stage, in export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExportStage {
    Resources,
    Roles,
    UserAttributes,
    Relations,
    ConditionSets,
    ResourceSets,
    UserSets,
    RoleDerivations,
}

impl ExportStage {
    /// Every stage, in export order
    pub const ALL: [ExportStage; 8] = [
        Self::Resources,
        Self::Roles,
        Self::UserAttributes,
        Self::Relations,
        Self::ConditionSets,
        Self::ResourceSets,
        Self::UserSets,
        Self::RoleDerivations,
    ];

    /// Display name used in progress messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::Roles => "roles",
            Self::UserAttributes => "user attributes",
            Self::Relations => "relations",
            Self::ConditionSets => "condition set rules",
            Self::ResourceSets => "resource sets",
            Self::UserSets => "user sets",
            Self::RoleDerivations => "role derivations",
        }
    }

    /// Section comment heading the stage's output
    pub fn title(&self) -> &'static str {
        match self {
            Self::Resources => "Resources",
            Self::Roles => "Roles",
            Self::UserAttributes => "User Attributes",
            Self::Relations => "Relations",
            Self::ConditionSets => "Condition Set Rules",
            Self::ResourceSets => "Resource Sets",
            Self::UserSets => "User Sets",
            Self::RoleDerivations => "Role Derivations",
        }
    }
}

impl std::fmt::Display for ExportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A generation stage
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Stage this generator implements
    fn stage(&self) -> ExportStage;

    /// Name used for progress reporting
    fn name(&self) -> &'static str {
        self.stage().name()
    }

    /// Fetch and render this stage's entities
    ///
    /// Returns `Ok(None)` when there is nothing to render. Rendered text
    /// starts with a blank line so sections can be appended directly.
    async fn generate_hcl(&self) -> Result<Option<String>, ExportError>;
}

/// Dependencies shared by every generator of one export
#[derive(Clone)]
pub struct GeneratorContext {
    pub client: Arc<dyn PolicyStateClient>,
    pub warnings: WarningCollector,
    pub labels: LabelRegistry,
}

impl GeneratorContext {
    pub fn new(client: Arc<dyn PolicyStateClient>, warnings: WarningCollector) -> Self {
        Self {
            client,
            warnings,
            labels: LabelRegistry::new(),
        }
    }
}

/// The eight generators, in export order
///
/// Later stages reference entities emitted by earlier ones (relations and
/// sets refer to resources, derivations to roles) and resolve them through
/// the labels those stages registered, so the order is fixed.
pub fn default_generators(context: &GeneratorContext) -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(ResourceGenerator::new(context.clone())),
        Box::new(RoleGenerator::new(context.clone())),
        Box::new(UserAttributesGenerator::new(context.clone())),
        Box::new(RelationGenerator::new(context.clone())),
        Box::new(ConditionSetGenerator::new(context.clone())),
        Box::new(ResourceSetGenerator::new(context.clone())),
        Box::new(UserSetGenerator::new(context.clone())),
        Box::new(RoleDerivationGenerator::new(context.clone())),
    ]
}

/// Join rendered blocks under a section comment
///
/// `None` when there are no blocks, so empty stages add nothing.
pub(crate) fn render_section(stage: ExportStage, blocks: Vec<String>) -> Option<String> {
    if blocks.is_empty() {
        return None;
    }

    let mut out = format!("\n# {}\n", stage.title());
    out.push_str(&blocks.join("\n"));
    Some(out)
}

/// Treat `None`, empty and whitespace-only values alike
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_export_state::SnapshotClient;

    #[test]
    fn default_generators_follow_stage_order() {
        let context = GeneratorContext::new(Arc::new(SnapshotClient::empty()), WarningCollector::new());
        let stages: Vec<_> = default_generators(&context).iter().map(|g| g.stage()).collect();
        assert_eq!(stages, ExportStage::ALL.to_vec());
    }

    #[test]
    fn section_rendering() {
        assert_eq!(render_section(ExportStage::Roles, vec![]), None);
        assert_eq!(
            render_section(ExportStage::Roles, vec!["a {\n}\n".to_string(), "b {\n}\n".to_string()]),
            Some("\n# Roles\na {\n}\n\nb {\n}\n".to_string())
        );
    }

    #[test]
    fn non_empty_values() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&Some(" doc ".to_string())), Some("doc"));
    }
}
