//! Authorization actions exposed by each resource category
//!
//! Static: the same action set is attached to every resource of a category,
//! whatever the input schema contains.

use serde::{Deserialize, Serialize};

/// Kind of query-engine object a resource was mapped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Catalog,
    Schema,
    Table,
    Column,
    Function,
    View,
    MaterializedView,
    Procedure,
}

impl ResourceCategory {
    /// Every category, in mapping order
    pub const ALL: [ResourceCategory; 8] = [
        Self::Catalog,
        Self::Schema,
        Self::Table,
        Self::Column,
        Self::Function,
        Self::View,
        Self::MaterializedView,
        Self::Procedure,
    ];

    /// Slug used inside resource keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
            Self::Function => "function",
            Self::View => "view",
            Self::MaterializedView => "materialized_view",
            Self::Procedure => "procedure",
        }
    }

    /// Actions attached to resources of this category
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Self::Catalog => &[
                "AccessCatalog",
                "CreateCatalog",
                "DropCatalog",
                "ShowSchemas",
            ],
            Self::Schema => &[
                "CreateSchema",
                "DropSchema",
                "RenameSchema",
                "ShowCreateSchema",
                "ShowTables",
                "SetSchemaAuthorization",
            ],
            Self::Table => &[
                "CreateTable",
                "DropTable",
                "RenameTable",
                "ShowCreateTable",
                "InsertIntoTable",
                "DeleteFromTable",
                "TruncateTable",
                "UpdateTableColumns",
                "AddColumn",
                "DropColumn",
                "RenameColumn",
                "ShowColumns",
                "SetTableComment",
            ],
            Self::Column => &["SelectFromColumns", "SetColumnComment"],
            Self::Function => &[
                "ExecuteFunction",
                "ShowFunctions",
                "CreateFunction",
                "DropFunction",
                "ShowCreateFunction",
            ],
            Self::View => &[
                "CreateView",
                "DropView",
                "RenameView",
                "CreateViewWithSelectFromColumns",
                "SetViewComment",
            ],
            Self::MaterializedView => &[
                "CreateMaterializedView",
                "DropMaterializedView",
                "RefreshMaterializedView",
                "RenameMaterializedView",
                "SetMaterializedViewProperties",
            ],
            Self::Procedure => &["ExecuteProcedure"],
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn required_actions_present() {
        let required: [(ResourceCategory, &[&str]); 8] = [
            (ResourceCategory::Catalog, &["AccessCatalog"]),
            (ResourceCategory::Schema, &["CreateSchema"]),
            (ResourceCategory::Table, &["CreateTable"]),
            (ResourceCategory::Column, &["SelectFromColumns"]),
            (ResourceCategory::Function, &["ExecuteFunction", "ShowFunctions"]),
            (ResourceCategory::View, &["CreateView", "DropView"]),
            (
                ResourceCategory::MaterializedView,
                &["CreateMaterializedView", "RefreshMaterializedView"],
            ),
            (ResourceCategory::Procedure, &["ExecuteProcedure"]),
        ];

        for (category, actions) in required {
            for action in actions {
                assert!(
                    category.actions().contains(action),
                    "{} is missing {}",
                    category,
                    action
                );
            }
        }
    }

    #[test]
    fn action_sets_have_no_duplicates() {
        for category in ResourceCategory::ALL {
            let unique: HashSet<_> = category.actions().iter().collect();
            assert_eq!(unique.len(), category.actions().len(), "{}", category);
        }
    }

    #[test]
    fn category_slugs() {
        assert_eq!(ResourceCategory::MaterializedView.as_str(), "materialized_view");
        assert_eq!(
            serde_json::to_string(&ResourceCategory::MaterializedView).unwrap(),
            "\"materialized_view\""
        );
    }
}
