//! In-memory repositories for tests, demos and the CLI.
//!
//! `MemoryRelationshipRepository` is shared by every (owner, target) pair;
//! linkage is keyed by owner type, owner id and field name.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde::Serialize;

use crate::config::LinkageConfig;
use crate::ports::{RelationshipRepository, ResourceInstance, ResourceRepository, Result};
use crate::query::QueryParams;
use crate::registry::ResourceRegistry;
use crate::type_parser::{IdValue, TypeParser};

// ── MemoryResourceRepository ──

pub struct MemoryResourceRepository {
    resource_type: String,
    inner: RwLock<BTreeMap<IdValue, ResourceInstance>>,
}

impl MemoryResourceRepository {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Store an instance with no attributes and return it.
    pub fn insert(&self, id: IdValue) -> Result<ResourceInstance> {
        let instance = ResourceInstance::new(self.resource_type.clone(), id);
        self.save(instance.clone())?;
        Ok(instance)
    }

    pub fn save(&self, instance: ResourceInstance) -> Result<()> {
        if instance.resource_type != self.resource_type {
            bail!(
                "cannot store {} in the {} repository",
                instance.resource_type,
                self.resource_type
            );
        }
        let mut store = self.inner.write().map_err(|e| anyhow!("Lock: {}", e))?;
        store.insert(instance.id.clone(), instance);
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let store = self.inner.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(store.len())
    }
}

#[async_trait]
impl ResourceRepository for MemoryResourceRepository {
    async fn find_one(&self, id: &IdValue, _params: &QueryParams) -> Result<ResourceInstance> {
        let store = self.inner.read().map_err(|e| anyhow!("Lock: {}", e))?;
        store
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("{} {} not found", self.resource_type, id))
    }
}

// ── MemoryRelationshipRepository ──

/// Stored linkage of one relationship field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoredLinkage {
    ToOne(Option<IdValue>),
    ToMany(Vec<IdValue>),
}

type LinkKey = (String, IdValue, String);

#[derive(Default)]
pub struct MemoryRelationshipRepository {
    inner: RwLock<HashMap<LinkKey, StoredLinkage>>,
}

impl MemoryRelationshipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current linkage of `field` on the given owner, if ever written.
    pub fn linkage(
        &self,
        resource_type: &str,
        id: &IdValue,
        field: &str,
    ) -> Result<Option<StoredLinkage>> {
        let store = self.inner.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(store
            .get(&(resource_type.to_string(), id.clone(), field.to_string()))
            .cloned())
    }

    fn write(&self, source: &ResourceInstance, field: &str, linkage: StoredLinkage) -> Result<()> {
        let mut store = self.inner.write().map_err(|e| anyhow!("Lock: {}", e))?;
        store.insert(key(source, field), linkage);
        Ok(())
    }
}

fn key(source: &ResourceInstance, field: &str) -> LinkKey {
    (
        source.resource_type.clone(),
        source.id.clone(),
        field.to_string(),
    )
}

#[async_trait]
impl RelationshipRepository for MemoryRelationshipRepository {
    async fn set_relation(
        &self,
        source: &ResourceInstance,
        target_id: Option<IdValue>,
        field_name: &str,
    ) -> Result<()> {
        self.write(source, field_name, StoredLinkage::ToOne(target_id))
    }

    async fn set_relations(
        &self,
        source: &ResourceInstance,
        target_ids: Vec<IdValue>,
        field_name: &str,
    ) -> Result<()> {
        self.write(source, field_name, StoredLinkage::ToMany(target_ids))
    }

    async fn add_relations(
        &self,
        source: &ResourceInstance,
        target_ids: Vec<IdValue>,
        field_name: &str,
    ) -> Result<()> {
        let mut store = self.inner.write().map_err(|e| anyhow!("Lock: {}", e))?;
        let entry = store
            .entry(key(source, field_name))
            .or_insert_with(|| StoredLinkage::ToMany(Vec::new()));

        let StoredLinkage::ToMany(existing) = entry else {
            bail!(
                "{} {} field {} holds a to-one linkage",
                source.resource_type,
                source.id,
                field_name
            );
        };
        for id in target_ids {
            if !existing.contains(&id) {
                existing.push(id);
            }
        }
        Ok(())
    }
}

// ── Wiring ──

/// Build a registry backed entirely by in-memory repositories.
///
/// Every resource type in `config` gets a `MemoryResourceRepository` seeded
/// with its fixture ids; every relationship field is served by the returned
/// shared `MemoryRelationshipRepository`.
pub fn memory_registry(
    config: &LinkageConfig,
) -> anyhow::Result<(ResourceRegistry, Arc<MemoryRelationshipRepository>)> {
    let parser = TypeParser::new();
    let relationships = Arc::new(MemoryRelationshipRepository::new());
    let mut builder = ResourceRegistry::builder();

    for information in config.resource_informations()? {
        let resource_type = information.resource_type().to_string();
        let repository = MemoryResourceRepository::new(resource_type.clone());
        for fixture in config.fixtures(&resource_type) {
            repository.insert(parser.parse(fixture, information.id_type())?)?;
        }

        let targets: Vec<String> = information
            .relationship_fields()
            .iter()
            .map(|field| field.target_type.clone())
            .collect();

        builder = builder.resource(information, Arc::new(repository));
        for target in targets {
            builder = builder.relationship_repository(
                resource_type.clone(),
                target,
                relationships.clone() as Arc<dyn RelationshipRepository>,
            );
        }
    }

    Ok((builder.build()?, relationships))
}
