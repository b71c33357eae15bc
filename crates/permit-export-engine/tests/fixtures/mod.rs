//! Test fixtures for export tests
//!
//! A small document-management policy touching every state category, plus
//! a variant with one defect per category.

#![allow(dead_code)]

use permit_export_state::{
    AttributeBlock, ConditionSetRule, PolicySnapshot, Relation, Resource, ResourceSet, Role,
    RoleDerivation, UserAttribute, UserSet,
};
use serde_json::json;

/// Well-formed state: every entity renders without warnings
pub fn document_policy() -> PolicySnapshot {
    PolicySnapshot {
        resources: vec![
            Resource::new("document", "Document")
                .with_action("read")
                .with_action("write")
                .with_attribute("owner", AttributeBlock::new("string"))
                .with_attribute("private", AttributeBlock::new("bool")),
            Resource::new("folder", "Folder").with_action("read"),
            Resource::new("__user", "User").with_action("read"),
        ],
        roles: vec![
            Role::new("viewer", "Viewer").with_permission("document:read"),
            Role::new("editor", "Editor")
                .with_permission("document:write")
                .with_extends("viewer"),
            Role::new("editor", "Editor").on_resource("folder").with_permission("folder:read"),
            Role::new("editor", "Editor").on_resource("document").with_permission("document:write"),
        ],
        user_attributes: vec![UserAttribute {
            key: "department".to_string(),
            attribute_type: "string".to_string(),
            description: Some("Department name".to_string()),
        }],
        relations: vec![Relation {
            key: "parent".to_string(),
            name: "Parent".to_string(),
            description: None,
            subject_resource: Some("folder".to_string()),
            object_resource: Some("document".to_string()),
        }],
        condition_set_rules: vec![ConditionSetRule {
            user_set: Some("engineers".to_string()),
            resource_set: Some("private_docs".to_string()),
            permission: Some("document:read".to_string()),
        }],
        resource_sets: vec![ResourceSet {
            key: "private_docs".to_string(),
            name: "Private documents".to_string(),
            description: None,
            resource: Some("document".to_string()),
            conditions: Some(json!({ "allOf": [{ "resource.private": { "equals": true } }] })),
        }],
        user_sets: vec![UserSet {
            key: "engineers".to_string(),
            name: "Engineers".to_string(),
            description: None,
            conditions: Some(json!({ "allOf": [{ "user.department": { "equals": "eng" } }] })),
        }],
        role_derivations: vec![RoleDerivation {
            role: "editor".to_string(),
            on_resource: "folder".to_string(),
            to_role: "editor".to_string(),
            resource: "document".to_string(),
            linked_by: "parent".to_string(),
        }],
    }
}

/// One recoverable defect per category, in stage order
pub fn defective_policy() -> PolicySnapshot {
    PolicySnapshot {
        resources: vec![Resource::new("empty", "Empty")],
        roles: vec![Role::new("admin", "Admin").with_permission("everything")],
        user_attributes: vec![UserAttribute {
            key: "clearance".to_string(),
            attribute_type: "level".to_string(),
            description: None,
        }],
        relations: vec![Relation {
            key: "owner".to_string(),
            name: "Owner".to_string(),
            description: None,
            subject_resource: None,
            object_resource: Some("document".to_string()),
        }],
        condition_set_rules: vec![ConditionSetRule {
            user_set: Some("engineers".to_string()),
            resource_set: None,
            permission: Some("document:read".to_string()),
        }],
        resource_sets: vec![ResourceSet {
            key: "orphans".to_string(),
            name: "Orphans".to_string(),
            description: None,
            resource: None,
            conditions: None,
        }],
        user_sets: vec![UserSet {
            key: "anyone".to_string(),
            name: "Anyone".to_string(),
            description: None,
            conditions: None,
        }],
        role_derivations: vec![RoleDerivation::default()],
    }
}
