//! Live authorization-model state
//!
//! Entity types for resources, roles, user attributes, relations,
//! condition-set rules, resource sets, user sets and role derivations, the
//! [`PolicyStateClient`] trait the export pipeline reads them through, and a
//! snapshot-backed client.
//!
//! ## Example
//!
//! ```rust,ignore
//! use permit_export_state::{PolicyStateClient, SnapshotClient};
//!
//! let client = SnapshotClient::from_file("state.json").await?;
//! client.test_connection().await?;
//! let roles = client.list_roles().await?;
//! ```

pub mod client;
pub mod model;
pub mod snapshot;

pub use client::{FetchError, PolicyStateClient, StateCategory};
pub use model::{
    ActionBlock, AttributeBlock, ConditionSetRule, PolicySnapshot, Relation, Resource,
    ResourceSet, Role, RoleDerivation, UserAttribute, UserSet,
};
pub use snapshot::{SnapshotClient, SnapshotClientBuilder};
