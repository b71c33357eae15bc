//! Foreign schema to canonical resource mapping
//!
//! Every catalog, schema, table, column, function, view, materialized view
//! and procedure becomes exactly one [`ResourceDefinition`]. Output order is
//! stable: categories in the order above, and input order within each
//! category, so regenerated documents diff cleanly.

use crate::actions::ResourceCategory;
use crate::schema::{ColumnInfo, ForeignSchema};
use crate::typemap::map_type;
use permit_export_core::config::DEFAULT_MAPPER_DOMAIN;
use permit_export_core::{AttributeSpec, CanonicalType, ResourceDefinition};
use std::collections::{BTreeMap, HashMap};

/// Attribute holding a function's mapped return type
pub const RETURN_TYPE_ATTRIBUTE: &str = "returnType";

/// Attribute describing a routine's argument list
pub const ARGUMENT_TYPES_ATTRIBUTE: &str = "argumentTypes";

/// Map a foreign schema with the default `trino` key domain
pub fn map_schema_to_resources(schema: &ForeignSchema) -> Vec<ResourceDefinition> {
    SchemaMapper::default().map(schema)
}

/// Schema mapper with a configurable key domain
///
/// Pure and deterministic: mapping the same schema twice yields identical
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMapper {
    domain: String,
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new(DEFAULT_MAPPER_DOMAIN)
    }
}

impl SchemaMapper {
    /// Create a mapper whose keys start with `<domain>-`
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Map every object of the schema to a resource definition
    pub fn map(&self, schema: &ForeignSchema) -> Vec<ResourceDefinition> {
        let mut resources = Vec::with_capacity(Self::expected_count(schema));

        for catalog in &schema.catalogs {
            resources.push(self.resource(ResourceCategory::Catalog, &[catalog.name.as_str()]));
        }

        for s in &schema.schemas {
            resources.push(self.resource(ResourceCategory::Schema, &[s.catalog.as_str(), s.name.as_str()]));
        }

        for table in &schema.tables {
            resources.push(
                self.resource(
                    ResourceCategory::Table,
                    &[table.catalog.as_str(), table.schema.as_str(), table.name.as_str()],
                )
                .with_attributes(column_attributes(&table.columns)),
            );
        }

        for table in &schema.tables {
            for column in &table.columns {
                resources.push(self.resource(
                    ResourceCategory::Column,
                    &[table.catalog.as_str(), table.schema.as_str(), table.name.as_str(), column.name.as_str()],
                ));
            }
        }

        for function in &schema.functions {
            resources.push(
                self.resource(
                    ResourceCategory::Function,
                    &[function.catalog.as_str(), function.schema.as_str(), function.name.as_str()],
                )
                .with_attribute(
                    RETURN_TYPE_ATTRIBUTE,
                    AttributeSpec::new(map_type(&function.return_type)),
                )
                .with_attribute(
                    ARGUMENT_TYPES_ATTRIBUTE,
                    AttributeSpec::new(CanonicalType::Array),
                ),
            );
        }

        for view in &schema.views {
            resources.push(
                self.resource(ResourceCategory::View, &[view.catalog.as_str(), view.schema.as_str(), view.name.as_str()])
                    .with_attributes(column_attributes(&view.columns)),
            );
        }

        for view in &schema.materialized_views {
            resources.push(
                self.resource(
                    ResourceCategory::MaterializedView,
                    &[view.catalog.as_str(), view.schema.as_str(), view.name.as_str()],
                )
                .with_attributes(column_attributes(&view.columns)),
            );
        }

        for procedure in &schema.procedures {
            resources.push(
                self.resource(
                    ResourceCategory::Procedure,
                    &[procedure.catalog.as_str(), procedure.schema.as_str(), procedure.name.as_str()],
                )
                .with_attribute(
                    ARGUMENT_TYPES_ATTRIBUTE,
                    AttributeSpec::new(CanonicalType::Array),
                ),
            );
        }

        tracing::debug!(
            domain = %self.domain,
            resources = resources.len(),
            "Mapped foreign schema"
        );

        resources
    }

    /// Resource key: `<domain>-<category>-<path joined by '-'>`, lower-cased
    pub fn resource_key(&self, category: ResourceCategory, path: &[&str]) -> String {
        let mut key = format!("{}-{}", self.domain, category.as_str());
        for segment in path {
            key.push('-');
            key.push_str(segment);
        }
        key.to_lowercase()
    }

    fn resource(&self, category: ResourceCategory, path: &[&str]) -> ResourceDefinition {
        ResourceDefinition::new(
            self.resource_key(category, path),
            path.join("."),
            category.actions().iter().copied(),
        )
    }

    /// Exact number of resources `map` will return
    pub fn expected_count(schema: &ForeignSchema) -> usize {
        schema.catalogs.len()
            + schema.schemas.len()
            + schema.tables.len()
            + schema.column_count()
            + schema.functions.len()
            + schema.views.len()
            + schema.materialized_views.len()
            + schema.procedures.len()
    }
}

/// One attribute per column, typed through the type map
fn column_attributes(columns: &[ColumnInfo]) -> BTreeMap<String, AttributeSpec> {
    columns
        .iter()
        .map(|c| {
            (
                c.name.clone(),
                AttributeSpec::from_column(map_type(&c.data_type), c.nullable),
            )
        })
        .collect()
}

/// Keys that occur more than once, in order of first occurrence
///
/// Overloaded functions, or names that only differ by case, produce the
/// same key.
pub fn duplicate_keys(resources: &[ResourceDefinition]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for resource in resources {
        let count = counts.entry(resource.key.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(resource.key.clone());
        }
    }

    duplicates
}
