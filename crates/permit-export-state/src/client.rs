//! Policy-state client trait for fetching live authorization-model state

use crate::model::{
    ConditionSetRule, Relation, Resource, ResourceSet, Role, RoleDerivation, UserAttribute,
    UserSet,
};
use std::fmt;

/// Category of live state, one per list call on [`PolicyStateClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateCategory {
    Resources,
    Roles,
    UserAttributes,
    Relations,
    ConditionSetRules,
    ResourceSets,
    UserSets,
    RoleDerivations,
}

impl StateCategory {
    /// Every category, in export order
    pub const ALL: [StateCategory; 8] = [
        Self::Resources,
        Self::Roles,
        Self::UserAttributes,
        Self::Relations,
        Self::ConditionSetRules,
        Self::ResourceSets,
        Self::UserSets,
        Self::RoleDerivations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::Roles => "roles",
            Self::UserAttributes => "user_attributes",
            Self::Relations => "relations",
            Self::ConditionSetRules => "condition_set_rules",
            Self::ResourceSets => "resource_sets",
            Self::UserSets => "user_sets",
            Self::RoleDerivations => "role_derivations",
        }
    }

    /// Position in [`StateCategory::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur when fetching live state
///
/// All of these are fatal to an export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for clients that read live authorization-model state
///
/// One list call per category. Implementations talk to the policy API (or a
/// stand-in for it); the export pipeline only ever depends on this trait.
#[async_trait::async_trait]
pub trait PolicyStateClient: Send + Sync {
    /// Client name (e.g., "Snapshot")
    fn name(&self) -> &'static str;

    /// Validate credentials and reachability before fetching anything
    async fn test_connection(&self) -> Result<(), FetchError>;

    async fn list_resources(&self) -> Result<Vec<Resource>, FetchError>;

    async fn list_roles(&self) -> Result<Vec<Role>, FetchError>;

    async fn list_user_attributes(&self) -> Result<Vec<UserAttribute>, FetchError>;

    async fn list_relations(&self) -> Result<Vec<Relation>, FetchError>;

    async fn list_condition_set_rules(&self) -> Result<Vec<ConditionSetRule>, FetchError>;

    async fn list_resource_sets(&self) -> Result<Vec<ResourceSet>, FetchError>;

    async fn list_user_sets(&self) -> Result<Vec<UserSet>, FetchError>;

    async fn list_role_derivations(&self) -> Result<Vec<RoleDerivation>, FetchError>;
}
