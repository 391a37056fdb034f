//! Resource registry: resource type name -> metadata + repositories.
//!
//! Two phases: a [`ResourceRegistryBuilder`] collects registrations at
//! startup, [`ResourceRegistryBuilder::build`] validates and seals them into
//! a [`ResourceRegistry`] that only exposes read accessors. Share the sealed
//! registry behind an `Arc`; it is never mutated afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::ports::{RelationshipRepository, ResourceRepository};
use crate::resource::ResourceInformation;

/// Metadata and repositories for one resource type.
pub struct RegistryEntry {
    information: ResourceInformation,
    repository: Arc<dyn ResourceRepository>,
    /// target resource type -> relationship repository
    relationship_repositories: HashMap<String, Arc<dyn RelationshipRepository>>,
}

impl RegistryEntry {
    pub fn resource_information(&self) -> &ResourceInformation {
        &self.information
    }

    pub fn resource_repository(&self) -> &dyn ResourceRepository {
        self.repository.as_ref()
    }

    pub fn relationship_repository_for(
        &self,
        target_type: &str,
    ) -> Option<&dyn RelationshipRepository> {
        self.relationship_repositories
            .get(target_type)
            .map(|repo| repo.as_ref())
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets: Vec<&str> = self
            .relationship_repositories
            .keys()
            .map(String::as_str)
            .collect();
        targets.sort_unstable();
        f.debug_struct("RegistryEntry")
            .field("information", &self.information)
            .field("relationship_targets", &targets)
            .finish_non_exhaustive()
    }
}

/// Sealed, read-only registry of resource types.
#[derive(Debug)]
pub struct ResourceRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl ResourceRegistry {
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    pub fn get_entry(&self, resource_type: &str) -> Option<&RegistryEntry> {
        self.entries.get(resource_type)
    }

    /// Registered resource type names, sorted.
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Startup-phase collector for [`ResourceRegistry`].
#[derive(Default)]
pub struct ResourceRegistryBuilder {
    resources: Vec<(ResourceInformation, Arc<dyn ResourceRepository>)>,
    relationships: Vec<(String, String, Arc<dyn RelationshipRepository>)>,
}

impl ResourceRegistryBuilder {
    pub fn resource(
        mut self,
        information: ResourceInformation,
        repository: Arc<dyn ResourceRepository>,
    ) -> Self {
        self.resources.push((information, repository));
        self
    }

    /// Register the repository persisting `owner -> target` linkage.
    /// A later registration for the same pair replaces an earlier one.
    pub fn relationship_repository(
        mut self,
        owner: impl Into<String>,
        target: impl Into<String>,
        repository: Arc<dyn RelationshipRepository>,
    ) -> Self {
        self.relationships
            .push((owner.into(), target.into(), repository));
        self
    }

    /// Validate and seal.
    ///
    /// Hard errors: duplicate resource types, relationship repositories for
    /// unregistered owners. Dangling relationship targets and missing
    /// relationship repositories are only logged; requests touching them fail
    /// with a typed error at dispatch time.
    pub fn build(self) -> Result<ResourceRegistry, RegistryError> {
        let mut entries: HashMap<String, RegistryEntry> = HashMap::new();

        for (information, repository) in self.resources {
            let resource_type = information.resource_type().to_string();
            if entries.contains_key(&resource_type) {
                return Err(RegistryError::DuplicateResource(resource_type));
            }
            entries.insert(
                resource_type,
                RegistryEntry {
                    information,
                    repository,
                    relationship_repositories: HashMap::new(),
                },
            );
        }

        for (owner, target, repository) in self.relationships {
            let Some(entry) = entries.get_mut(&owner) else {
                return Err(RegistryError::UnknownOwner { owner, target });
            };
            entry.relationship_repositories.insert(target, repository);
        }

        for entry in entries.values() {
            let owner = entry.information.resource_type();
            for field in entry.information.relationship_fields() {
                if !entries.contains_key(&field.target_type) {
                    tracing::warn!(
                        owner,
                        field = %field.name,
                        target = %field.target_type,
                        "relationship target type is not registered"
                    );
                }
                if !entry
                    .relationship_repositories
                    .contains_key(&field.target_type)
                {
                    tracing::warn!(
                        owner,
                        field = %field.name,
                        target = %field.target_type,
                        "no relationship repository for relationship field"
                    );
                }
            }
        }

        tracing::debug!(resources = entries.len(), "resource registry sealed");
        Ok(ResourceRegistry { entries })
    }
}
