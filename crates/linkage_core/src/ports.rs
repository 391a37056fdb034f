//! Repository port traits: implemented by the hosting application.
//! The controllers depend only on these traits.

use async_trait::async_trait;
use serde::Serialize;

use crate::query::QueryParams;
use crate::type_parser::IdValue;

pub type Result<T> = anyhow::Result<T>;

/// A loaded resource, as returned by a [`ResourceRepository`].
///
/// `attributes` is owned by the repository implementation and never read by
/// the core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceInstance {
    pub resource_type: String,
    pub id: IdValue,
    pub attributes: serde_json::Value,
}

impl ResourceInstance {
    pub fn new(resource_type: impl Into<String>, id: impl Into<IdValue>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes: serde_json::Value::Null,
        }
    }
}

/// Primary repository of one resource type.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Load one resource. A missing resource is reported as an error by the
    /// implementation; the caller propagates it unchanged.
    async fn find_one(&self, id: &IdValue, params: &QueryParams) -> Result<ResourceInstance>;
}

/// Persistence of relationship linkage for one (owner type, target type) pair.
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Replace a to-one linkage. `None` clears it.
    async fn set_relation(
        &self,
        source: &ResourceInstance,
        target_id: Option<IdValue>,
        field_name: &str,
    ) -> Result<()>;

    /// Replace a to-many linkage with exactly `target_ids`, in order.
    async fn set_relations(
        &self,
        source: &ResourceInstance,
        target_ids: Vec<IdValue>,
        field_name: &str,
    ) -> Result<()>;

    /// Add `target_ids` to a to-many linkage, keeping existing members.
    async fn add_relations(
        &self,
        source: &ResourceInstance,
        target_ids: Vec<IdValue>,
        field_name: &str,
    ) -> Result<()>;
}
