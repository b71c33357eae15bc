//! Foreign schema metadata, as discovered from a relational query engine

use serde::{Deserialize, Serialize};

/// Complete metadata tree of a query engine
///
/// Field names follow the engine's JSON export (`materializedViews`,
/// `returnType`, `argumentTypes`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignSchema {
    #[serde(default)]
    pub catalogs: Vec<CatalogInfo>,

    #[serde(default)]
    pub schemas: Vec<SchemaInfo>,

    #[serde(default)]
    pub tables: Vec<TableInfo>,

    #[serde(default)]
    pub functions: Vec<FunctionInfo>,

    #[serde(default)]
    pub views: Vec<ViewInfo>,

    #[serde(default)]
    pub materialized_views: Vec<ViewInfo>,

    #[serde(default)]
    pub procedures: Vec<ProcedureInfo>,
}

impl ForeignSchema {
    /// Number of columns across all tables
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Whether the tree has no objects at all
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
            && self.schemas.is_empty()
            && self.tables.is_empty()
            && self.functions.is_empty()
            && self.views.is_empty()
            && self.materialized_views.is_empty()
            && self.procedures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub catalog: String,
    pub name: String,
}

/// A column of a table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,

    /// Engine type name, possibly parameterized (`varchar(255)`)
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub catalog: String,
    pub schema: String,
    pub name: String,

    /// Engine table type (`BASE TABLE`, ...)
    #[serde(rename = "type", default)]
    pub table_type: String,

    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInfo {
    pub catalog: String,
    pub schema: String,
    pub name: String,
    pub return_type: String,

    #[serde(default)]
    pub argument_types: Vec<String>,
}

/// A view or materialized view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInfo {
    pub catalog: String,
    pub schema: String,
    pub name: String,

    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureInfo {
    pub catalog: String,
    pub schema: String,
    pub name: String,

    #[serde(default)]
    pub argument_types: Vec<String>,
}
