//! Live authorization-model entities, as returned by the policy API
//!
//! Optional fields are optional because the API may omit them; generators
//! decide whether a missing field makes an entity unrenderable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Action exposed by a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionBlock {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Attribute declared on a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeBlock {
    /// Attribute type as reported by the API (`string`, `number`, ...)
    #[serde(rename = "type")]
    pub attribute_type: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl AttributeBlock {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub actions: BTreeMap<String, ActionBlock>,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeBlock>,
}

impl Resource {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: None,
            actions: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_action(mut self, key: impl Into<String>) -> Self {
        self.actions.insert(key.into(), ActionBlock::default());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, attribute: AttributeBlock) -> Self {
        self.attributes.insert(key.into(), attribute);
        self
    }

    /// Built-in resources (such as the user resource) carry a `__` prefix
    pub fn is_reserved(&self) -> bool {
        self.key.starts_with("__")
    }
}

/// Top-level role, or a role scoped to one resource when `resource` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Permissions as `resource:action` pairs
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Keys of roles this role inherits from
    #[serde(default)]
    pub extends: Vec<String>,

    #[serde(default)]
    pub resource: Option<String>,
}

impl Role {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: None,
            permissions: Vec::new(),
            extends: Vec::new(),
            resource: None,
        }
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn with_extends(mut self, role: impl Into<String>) -> Self {
        self.extends.push(role.into());
        self
    }

    pub fn on_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

/// Attribute of the built-in user resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAttribute {
    pub key: String,

    #[serde(rename = "type")]
    pub attribute_type: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Relation between two resources (`subject_resource` is related to `object_resource`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub subject_resource: Option<String>,

    #[serde(default)]
    pub object_resource: Option<String>,
}

/// Grants `permission` on `resource_set` to members of `user_set`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSetRule {
    #[serde(default)]
    pub user_set: Option<String>,

    #[serde(default)]
    pub resource_set: Option<String>,

    #[serde(default)]
    pub permission: Option<String>,
}

/// Condition set over the instances of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub resource: Option<String>,

    #[serde(default)]
    pub conditions: Option<serde_json::Value>,
}

/// Condition set over users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSet {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub conditions: Option<serde_json::Value>,
}

/// Grants `role` on `resource` to holders of `to_role` on a related
/// `on_resource`, through the relation `linked_by`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleDerivation {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub on_resource: String,

    #[serde(default)]
    pub to_role: String,

    #[serde(default)]
    pub resource: String,

    #[serde(default)]
    pub linked_by: String,
}

impl RoleDerivation {
    /// Names of the fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("role", &self.role),
            ("on_resource", &self.on_resource),
            ("to_role", &self.to_role),
            ("resource", &self.resource),
            ("linked_by", &self.linked_by),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Full authorization-model state of one environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub user_attributes: Vec<UserAttribute>,

    #[serde(default)]
    pub relations: Vec<Relation>,

    #[serde(default)]
    pub condition_set_rules: Vec<ConditionSetRule>,

    #[serde(default)]
    pub resource_sets: Vec<ResourceSet>,

    #[serde(default)]
    pub user_sets: Vec<UserSet>,

    #[serde(default)]
    pub role_derivations: Vec<RoleDerivation>,
}
