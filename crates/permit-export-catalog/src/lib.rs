//! Query-engine schema import
//!
//! Turns a foreign metadata tree (catalogs, schemas, tables and columns,
//! functions, views, materialized views, procedures) into canonical
//! resource definitions.
//!
//! ## Example
//!
//! ```rust,ignore
//! use permit_export_catalog::{map_schema_to_resources, ForeignSchemaSource, JsonSchemaSource};
//!
//! let schema = JsonSchemaSource::new("trino-schema.json").fetch_schema().await?;
//! let resources = map_schema_to_resources(&schema);
//! ```

pub mod actions;
pub mod mapper;
pub mod schema;
pub mod source;
pub mod typemap;

pub use actions::ResourceCategory;
pub use mapper::{duplicate_keys, map_schema_to_resources, SchemaMapper};
pub use schema::{CatalogInfo, ColumnInfo, ForeignSchema, FunctionInfo, ProcedureInfo, SchemaInfo, TableInfo, ViewInfo};
pub use source::{ForeignSchemaSource, JsonSchemaSource, SourceError, StaticSchemaSource};
pub use typemap::{map_type, FALLBACK_TYPE};
