//! `permitio_condition_set_rule` blocks

use super::resource_set::exported_resource;
use super::{
    non_empty, render_section, ExportStage, Generator, GeneratorContext, CONDITION_SET_RULE_TYPE,
    RESOURCE_SET_TYPE, USER_SET_TYPE,
};
use crate::error::ExportError;
use crate::hcl::HclWriter;
use permit_export_state::ConditionSetRule;

pub struct ConditionSetGenerator {
    context: GeneratorContext,
}

impl ConditionSetGenerator {
    pub fn new(context: GeneratorContext) -> Self {
        Self { context }
    }

    fn describe(rule: &ConditionSetRule) -> String {
        format!(
            "{} -> {} on {}",
            rule.user_set.as_deref().unwrap_or("?"),
            rule.permission.as_deref().unwrap_or("?"),
            rule.resource_set.as_deref().unwrap_or("?"),
        )
    }

    /// Reserve the labels of the user sets and resource sets that later
    /// stages will emit, so rules can reference them
    async fn declare_sets(&self) -> Result<(), ExportError> {
        let client = &self.context.client;
        let labels = &self.context.labels;

        let mut user_sets = client
            .list_user_sets()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        user_sets.sort_by(|a, b| a.key.cmp(&b.key));
        for set in &user_sets {
            labels.declare(USER_SET_TYPE, &set.key, &set.key);
        }

        let mut resource_sets = client
            .list_resource_sets()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        resource_sets.sort_by(|a, b| a.key.cmp(&b.key));
        for set in resource_sets
            .iter()
            .filter(|set| exported_resource(set, labels).is_some())
        {
            labels.declare(RESOURCE_SET_TYPE, &set.key, &set.key);
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Generator for ConditionSetGenerator {
    fn stage(&self) -> ExportStage {
        ExportStage::ConditionSets
    }

    async fn generate_hcl(&self) -> Result<Option<String>, ExportError> {
        let mut rules = self
            .context
            .client
            .list_condition_set_rules()
            .await
            .map_err(|e| ExportError::fetch(self.stage(), e))?;
        rules.sort_by(|a, b| {
            (&a.user_set, &a.resource_set, &a.permission).cmp(&(
                &b.user_set,
                &b.resource_set,
                &b.permission,
            ))
        });

        tracing::debug!(count = rules.len(), "Fetched condition set rules");

        if rules.is_empty() {
            return Ok(None);
        }
        self.declare_sets().await?;

        let labels = &self.context.labels;
        let mut blocks = Vec::new();

        for rule in &rules {
            let (Some(user_set), Some(resource_set), Some(permission)) = (
                non_empty(&rule.user_set),
                non_empty(&rule.resource_set),
                non_empty(&rule.permission),
            ) else {
                self.context.warnings.add(format!(
                    "Condition set rule '{}' is incomplete and was skipped",
                    Self::describe(rule)
                ));
                continue;
            };

            let (user_set_ref, resource_set_ref) = match (
                labels.resolve(USER_SET_TYPE, user_set),
                labels.resolve(RESOURCE_SET_TYPE, resource_set),
            ) {
                (Some(user_set_ref), Some(resource_set_ref)) => (user_set_ref, resource_set_ref),
                (user_set_ref, resource_set_ref) => {
                    let mut missing = Vec::new();
                    if user_set_ref.is_none() {
                        missing.push(format!("user set '{}'", user_set));
                    }
                    if resource_set_ref.is_none() {
                        missing.push(format!("resource set '{}'", resource_set));
                    }
                    self.context.warnings.add(format!(
                        "Condition set rule '{}' references {}, which is not exported; the rule was skipped",
                        Self::describe(rule),
                        missing.join(" and ")
                    ));
                    continue;
                }
            };

            let label_key = format!("{}_{}_{}", user_set, permission, resource_set);
            let label = labels.allocate(CONDITION_SET_RULE_TYPE, &label_key, &self.context.warnings);

            let mut w = HclWriter::new();
            w.open_resource(CONDITION_SET_RULE_TYPE, &label);
            w.expr("user_set", &format!("{}.key", user_set_ref));
            w.expr("resource_set", &format!("{}.key", resource_set_ref));
            w.string("permission", permission);
            w.expr_list("depends_on", &[user_set_ref, resource_set_ref]);
            w.close();
            blocks.push(w.finish());
        }

        Ok(render_section(self.stage(), blocks))
    }
}
