//! In-memory policy-state client backed by a [`PolicySnapshot`]
//!
//! Serves state captured earlier (for example a JSON dump of an
//! environment) without contacting the policy API. It's useful for:
//! - Offline exports from a saved snapshot
//! - Unit testing generators and the export pipeline
//! - Simulating transport failures for a single category
//!
//! ## Usage
//!
//! ```rust,ignore
//! use permit_export_state::{SnapshotClient, PolicyStateClient, StateCategory, FetchError};
//!
//! let client = SnapshotClient::from_file("state.json").await?;
//! let resources = client.list_resources().await?;
//!
//! // Simulate a failing category
//! let client = SnapshotClient::builder()
//!     .with_error(StateCategory::Relations, FetchError::NetworkError("reset".into()))
//!     .build();
//! ```

use crate::client::{FetchError, PolicyStateClient, StateCategory};
use crate::model::{
    ConditionSetRule, PolicySnapshot, Relation, Resource, ResourceSet, Role, RoleDerivation,
    UserAttribute, UserSet,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Snapshot-backed policy-state client
///
/// Clones share state, configured errors and call counters.
#[derive(Clone)]
pub struct SnapshotClient {
    /// Served state
    snapshot: Arc<RwLock<PolicySnapshot>>,

    /// Errors to return for specific categories
    errors: Arc<RwLock<HashMap<StateCategory, FetchError>>>,

    /// Number of list calls per category, indexed by `StateCategory::index`
    calls: Arc<[AtomicUsize; 8]>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,
}

impl SnapshotClient {
    /// Create a client serving the given snapshot
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
            errors: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(Default::default()),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Create a client with no state at all
    pub fn empty() -> Self {
        Self::new(PolicySnapshot::default())
    }

    pub fn builder() -> SnapshotClientBuilder {
        SnapshotClientBuilder::new()
    }

    /// Load a JSON snapshot file
    ///
    /// A document that does not match the snapshot shape is reported as an
    /// invalid response, the same way a malformed API payload would be.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            FetchError::ConfigError(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;

        let snapshot: PolicySnapshot = serde_json::from_str(&contents).map_err(|e| {
            FetchError::InvalidResponse(format!("Malformed snapshot {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            resources = snapshot.resources.len(),
            roles = snapshot.roles.len(),
            "Loaded policy snapshot"
        );

        Ok(Self::new(snapshot))
    }

    /// Replace the served state
    pub async fn set_snapshot(&self, snapshot: PolicySnapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Configure an error to be returned for a category
    pub async fn add_error(&self, category: StateCategory, error: FetchError) {
        self.errors.write().await.insert(category, error);
    }

    /// Clear all configured errors
    pub async fn clear_errors(&self) {
        self.errors.write().await.clear();
    }

    /// Number of list calls made for a category, including failed ones
    pub fn call_count(&self, category: StateCategory) -> usize {
        self.calls[category.index()].load(Ordering::SeqCst)
    }

    /// Number of list calls made across all categories
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Simulate latency if configured
    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    /// Count the call, wait, then fail if an error is configured
    async fn begin(&self, category: StateCategory) -> Result<(), FetchError> {
        self.calls[category.index()].fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(error) = self.errors.read().await.get(&category) {
            return Err(error.clone());
        }
        Ok(())
    }
}

impl Default for SnapshotClient {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait::async_trait]
impl PolicyStateClient for SnapshotClient {
    fn name(&self) -> &'static str {
        "Snapshot"
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(FetchError::NetworkError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, FetchError> {
        self.begin(StateCategory::Resources).await?;
        Ok(self.snapshot.read().await.resources.clone())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, FetchError> {
        self.begin(StateCategory::Roles).await?;
        Ok(self.snapshot.read().await.roles.clone())
    }

    async fn list_user_attributes(&self) -> Result<Vec<UserAttribute>, FetchError> {
        self.begin(StateCategory::UserAttributes).await?;
        Ok(self.snapshot.read().await.user_attributes.clone())
    }

    async fn list_relations(&self) -> Result<Vec<Relation>, FetchError> {
        self.begin(StateCategory::Relations).await?;
        Ok(self.snapshot.read().await.relations.clone())
    }

    async fn list_condition_set_rules(&self) -> Result<Vec<ConditionSetRule>, FetchError> {
        self.begin(StateCategory::ConditionSetRules).await?;
        Ok(self.snapshot.read().await.condition_set_rules.clone())
    }

    async fn list_resource_sets(&self) -> Result<Vec<ResourceSet>, FetchError> {
        self.begin(StateCategory::ResourceSets).await?;
        Ok(self.snapshot.read().await.resource_sets.clone())
    }

    async fn list_user_sets(&self) -> Result<Vec<UserSet>, FetchError> {
        self.begin(StateCategory::UserSets).await?;
        Ok(self.snapshot.read().await.user_sets.clone())
    }

    async fn list_role_derivations(&self) -> Result<Vec<RoleDerivation>, FetchError> {
        self.begin(StateCategory::RoleDerivations).await?;
        Ok(self.snapshot.read().await.role_derivations.clone())
    }
}

/// Builder for creating a SnapshotClient
///
/// ```rust,ignore
/// let client = SnapshotClient::builder()
///     .with_resource(Resource::new("document", "Document").with_action("read"))
///     .with_role(Role::new("viewer", "Viewer").with_permission("document:read"))
///     .with_latency(50)
///     .build();
/// ```
pub struct SnapshotClientBuilder {
    snapshot: PolicySnapshot,
    errors: HashMap<StateCategory, FetchError>,
    fail_connection: bool,
    latency_ms: u64,
}

impl SnapshotClientBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: PolicySnapshot::default(),
            errors: HashMap::new(),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(mut self, snapshot: PolicySnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.snapshot.resources.push(resource);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.snapshot.roles.push(role);
        self
    }

    pub fn with_user_attribute(mut self, attribute: UserAttribute) -> Self {
        self.snapshot.user_attributes.push(attribute);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.snapshot.relations.push(relation);
        self
    }

    pub fn with_condition_set_rule(mut self, rule: ConditionSetRule) -> Self {
        self.snapshot.condition_set_rules.push(rule);
        self
    }

    pub fn with_resource_set(mut self, set: ResourceSet) -> Self {
        self.snapshot.resource_sets.push(set);
        self
    }

    pub fn with_user_set(mut self, set: UserSet) -> Self {
        self.snapshot.user_sets.push(set);
        self
    }

    pub fn with_role_derivation(mut self, derivation: RoleDerivation) -> Self {
        self.snapshot.role_derivations.push(derivation);
        self
    }

    /// Fail every list call for `category` with `error`
    pub fn with_error(mut self, category: StateCategory, error: FetchError) -> Self {
        self.errors.insert(category, error);
        self
    }

    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn build(self) -> SnapshotClient {
        SnapshotClient {
            snapshot: Arc::new(RwLock::new(self.snapshot)),
            errors: Arc::new(RwLock::new(self.errors)),
            calls: Arc::new(Default::default()),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
        }
    }
}

impl Default for SnapshotClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_client_basic() {
        let client = SnapshotClient::builder()
            .with_resource(Resource::new("document", "Document").with_action("read"))
            .with_role(Role::new("viewer", "Viewer").with_permission("document:read"))
            .build();

        let resources = client.list_resources().await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].key, "document");

        let roles = client.list_roles().await.unwrap();
        assert_eq!(roles[0].permissions, vec!["document:read"]);
    }

    #[tokio::test]
    async fn test_snapshot_client_counts_calls() {
        let client = SnapshotClient::empty();

        client.list_resources().await.unwrap();
        client.list_resources().await.unwrap();
        client.list_user_sets().await.unwrap();

        assert_eq!(client.call_count(StateCategory::Resources), 2);
        assert_eq!(client.call_count(StateCategory::UserSets), 1);
        assert_eq!(client.call_count(StateCategory::Roles), 0);
        assert_eq!(client.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_client_category_error() {
        let client = SnapshotClient::builder()
            .with_error(
                StateCategory::Relations,
                FetchError::PermissionDenied("forbidden".to_string()),
            )
            .build();

        let result = client.list_relations().await;
        assert!(matches!(result, Err(FetchError::PermissionDenied(_))));
        // Failed calls are still counted
        assert_eq!(client.call_count(StateCategory::Relations), 1);
        assert!(client.list_roles().await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_client_runtime_errors() {
        let client = SnapshotClient::empty();
        client
            .add_error(StateCategory::Roles, FetchError::NetworkError("reset".to_string()))
            .await;
        assert!(client.list_roles().await.is_err());

        client.clear_errors().await;
        assert!(client.list_roles().await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_client_connection() {
        assert!(SnapshotClient::empty().test_connection().await.is_ok());

        let client = SnapshotClient::builder().with_connection_failure().build();
        assert!(matches!(
            client.test_connection().await,
            Err(FetchError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_client_clone_shares_state() {
        let client = SnapshotClient::empty();
        let cloned = client.clone();

        client
            .set_snapshot(PolicySnapshot {
                resources: vec![Resource::new("file", "File")],
                ..Default::default()
            })
            .await;

        assert_eq!(cloned.list_resources().await.unwrap().len(), 1);
        assert_eq!(client.call_count(StateCategory::Resources), 1);
    }

    #[tokio::test]
    async fn test_snapshot_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{ "user_sets": [{ "key": "admins", "name": "Admins" }] }"#,
        )
        .unwrap();

        let client = SnapshotClient::from_file(&path).await.unwrap();
        let sets = client.list_user_sets().await.unwrap();
        assert_eq!(sets[0].key, "admins");
        assert!(sets[0].conditions.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_from_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{ "resources": {} }"#).unwrap();

        let result = SnapshotClient::from_file(&path).await;
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }
}
