//! Test fixtures for schema mapping tests
//!
//! Small foreign schema trees resembling what a query engine reports for
//! a single catalog.

#![allow(dead_code)]

use permit_export_catalog::{
    CatalogInfo, ColumnInfo, ForeignSchema, FunctionInfo, ProcedureInfo, SchemaInfo, TableInfo,
    ViewInfo,
};

fn table(catalog: &str, schema: &str, name: &str, columns: Vec<ColumnInfo>) -> TableInfo {
    TableInfo {
        catalog: catalog.to_string(),
        schema: schema.to_string(),
        name: name.to_string(),
        table_type: "BASE TABLE".to_string(),
        columns,
    }
}

fn view(catalog: &str, schema: &str, name: &str, columns: Vec<ColumnInfo>) -> ViewInfo {
    ViewInfo {
        catalog: catalog.to_string(),
        schema: schema.to_string(),
        name: name.to_string(),
        columns,
    }
}

/// One catalog, one schema and a `users` table
///
/// - `id integer NOT NULL`
/// - `email varchar NOT NULL`
/// - `is_active boolean NULL`
pub fn users_schema() -> ForeignSchema {
    ForeignSchema {
        catalogs: vec![CatalogInfo { name: "testcat".to_string() }],
        schemas: vec![SchemaInfo {
            catalog: "testcat".to_string(),
            name: "public".to_string(),
        }],
        tables: vec![table(
            "testcat",
            "public",
            "users",
            vec![
                ColumnInfo::new("id", "integer", false),
                ColumnInfo::new("email", "varchar", false),
                ColumnInfo::new("is_active", "boolean", true),
            ],
        )],
        ..Default::default()
    }
}

/// One of each routine and view kind, no tables
pub fn routines_and_views_schema() -> ForeignSchema {
    ForeignSchema {
        catalogs: vec![CatalogInfo { name: "testcat".to_string() }],
        schemas: vec![SchemaInfo {
            catalog: "testcat".to_string(),
            name: "public".to_string(),
        }],
        functions: vec![FunctionInfo {
            catalog: "testcat".to_string(),
            schema: "public".to_string(),
            name: "my_func".to_string(),
            return_type: "integer".to_string(),
            argument_types: vec!["varchar".to_string(), "integer".to_string()],
        }],
        views: vec![view(
            "testcat",
            "public",
            "my_view",
            vec![
                ColumnInfo::new("col1", "varchar", false),
                ColumnInfo::new("col2", "integer", true),
            ],
        )],
        materialized_views: vec![view(
            "testcat",
            "public",
            "my_mview",
            vec![ColumnInfo::new("total", "decimal", false)],
        )],
        procedures: vec![ProcedureInfo {
            catalog: "testcat".to_string(),
            schema: "public".to_string(),
            name: "my_proc".to_string(),
            argument_types: vec!["varchar".to_string()],
        }],
        ..Default::default()
    }
}

/// Two catalogs with overlapping schema and table names
///
/// Distinct paths must still produce distinct keys.
pub fn multi_catalog_schema() -> ForeignSchema {
    let columns = || {
        vec![
            ColumnInfo::new("id", "bigint", false),
            ColumnInfo::new("payload", "json", true),
            ColumnInfo::new("tags", "array(varchar)", true),
            ColumnInfo::new("created_at", "timestamp(3) with time zone", false),
        ]
    };

    ForeignSchema {
        catalogs: vec![
            CatalogInfo { name: "hive".to_string() },
            CatalogInfo { name: "iceberg".to_string() },
        ],
        schemas: vec![
            SchemaInfo {
                catalog: "hive".to_string(),
                name: "sales".to_string(),
            },
            SchemaInfo {
                catalog: "iceberg".to_string(),
                name: "sales".to_string(),
            },
        ],
        tables: vec![
            table("hive", "sales", "orders", columns()),
            table("iceberg", "sales", "orders", columns()),
            table("iceberg", "sales", "customers", vec![ColumnInfo::new("id", "bigint", false)]),
        ],
        views: vec![view("hive", "sales", "orders", vec![ColumnInfo::new("id", "bigint", false)])],
        ..Default::default()
    }
}
