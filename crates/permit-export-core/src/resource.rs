//! Canonical resource types and attribute type system

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Canonical attribute type
///
/// Every foreign or live attribute type is reduced to one of these before
/// it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    /// Text
    String,

    /// Any numeric value
    Number,

    /// Boolean
    Bool,

    /// Free-form JSON document
    Json,

    /// Date, time or timestamp
    Time,

    /// Ordered list
    Array,

    /// Structured value with named fields
    Object,
}

impl CanonicalType {
    /// All canonical types, in declaration order
    pub const ALL: [CanonicalType; 7] = [
        Self::String,
        Self::Number,
        Self::Bool,
        Self::Json,
        Self::Time,
        Self::Array,
        Self::Object,
    ];

    /// Stable lower-case name used in rendered documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Json => "json",
            Self::Time => "time",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not a canonical type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown attribute type: '{0}'")]
pub struct UnknownTypeError(pub String);

impl FromStr for CanonicalType {
    type Err = UnknownTypeError;

    /// Strict parse; only the exact canonical names are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTypeError(s.to_string()))
    }
}

/// Description attached to attributes built from nullable columns
pub const NULLABLE_DESCRIPTION: &str = "nullable";

/// Type (and optional description) of a single resource attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Canonical type
    #[serde(rename = "type")]
    pub attribute_type: CanonicalType,

    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AttributeSpec {
    /// Create an attribute with no description
    pub fn new(attribute_type: CanonicalType) -> Self {
        Self {
            attribute_type,
            description: None,
        }
    }

    /// Create an attribute, marking it `nullable` when requested
    pub fn from_column(attribute_type: CanonicalType, nullable: bool) -> Self {
        let spec = Self::new(attribute_type);
        if nullable {
            spec.with_description(NULLABLE_DESCRIPTION)
        } else {
            spec
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Canonical, origin-independent representation of an authorizable resource
///
/// Built either from live policy state or from a foreign schema. Never
/// mutated once rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Unique slug within one export run
    pub key: String,

    /// Human-readable, dot-joined hierarchical name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Action names, in catalog order
    pub actions: Vec<String>,

    /// Attributes keyed by name
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSpec>,
}

impl ResourceDefinition {
    /// Create a resource with the given actions and no attributes
    pub fn new<I, S>(key: impl Into<String>, name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            name: name.into(),
            description: None,
            actions: actions.into_iter().map(Into::into).collect(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add (or replace) one attribute
    pub fn with_attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.insert(name.into(), spec);
        self
    }

    /// Replace the attribute map
    pub fn with_attributes(mut self, attributes: BTreeMap<String, AttributeSpec>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Check whether an action is exposed by this resource
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_type_display_and_parse() {
        for t in CanonicalType::ALL {
            assert_eq!(t.to_string().parse::<CanonicalType>(), Ok(t));
        }
        assert_eq!(
            "varchar".parse::<CanonicalType>(),
            Err(UnknownTypeError("varchar".to_string()))
        );
    }

    #[test]
    fn attribute_serialization_omits_missing_description() {
        let plain = serde_json::to_value(AttributeSpec::new(CanonicalType::Number)).unwrap();
        assert_eq!(plain, serde_json::json!({ "type": "number" }));

        let nullable =
            serde_json::to_value(AttributeSpec::from_column(CanonicalType::Number, true)).unwrap();
        assert_eq!(
            nullable,
            serde_json::json!({ "type": "number", "description": "nullable" })
        );
    }

    #[test]
    fn resource_builder() {
        let resource = ResourceDefinition::new("document", "Document", ["read", "write"])
            .with_attribute("title", AttributeSpec::new(CanonicalType::String));

        assert!(resource.has_action("read"));
        assert!(!resource.has_action("delete"));
        assert_eq!(
            resource.attribute("title").map(|a| a.attribute_type),
            Some(CanonicalType::String)
        );
        assert!(resource.description.is_none());
    }
}
