//! Resource schema configuration
//!
//! Loads resource types, their identifier types and relationship fields from
//! YAML, plus dispatch options. Converted into [`ResourceInformation`] values
//! through the typed builder before the registry is sealed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::controller::{ToManyMode, UpsertStrategy};
use crate::error::RegistryError;
use crate::resource::{RelationshipKind, ResourceInformation};
use crate::type_parser::IdType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid linkage configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct LinkageConfig {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    pub resources: BTreeMap<String, ResourceConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchConfig {
    /// POST on a to-many relationship adds members instead of replacing them.
    #[serde(default)]
    pub append_on_create: bool,
}

impl DispatchConfig {
    pub fn create_strategy(&self) -> UpsertStrategy {
        let mode = if self.append_on_create {
            ToManyMode::Append
        } else {
            ToManyMode::Replace
        };
        UpsertStrategy::create().with_to_many_mode(mode)
    }
}

/// Configuration for a single resource type
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub id: IdFieldConfig,
    #[serde(default)]
    pub relationships: Vec<RelationshipConfig>,
    /// Identifiers preloaded by the in-memory repositories
    #[serde(default)]
    pub fixtures: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdFieldConfig {
    #[serde(default = "default_id_name")]
    pub name: String,
    #[serde(rename = "type")]
    pub id_type: IdType,
}

fn default_id_name() -> String {
    "id".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipConfig {
    pub name: String,
    pub kind: RelationshipKind,
    pub target: String,
}

impl LinkageConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: LinkageConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resource metadata for every configured type, in name order.
    pub fn resource_informations(&self) -> Result<Vec<ResourceInformation>, RegistryError> {
        self.resources
            .iter()
            .map(|(resource_type, resource)| {
                let mut builder = ResourceInformation::builder(resource_type, resource.id.id_type)
                    .id_field_name(&resource.id.name);
                for relationship in &resource.relationships {
                    builder = match relationship.kind {
                        RelationshipKind::ToOne => {
                            builder.to_one(&relationship.name, &relationship.target)
                        }
                        RelationshipKind::ToMany => {
                            builder.to_many(&relationship.name, &relationship.target)
                        }
                    };
                }
                builder.build()
            })
            .collect()
    }

    pub fn fixtures(&self, resource_type: &str) -> &[String] {
        self.resources
            .get(resource_type)
            .map(|resource| resource.fixtures.as_slice())
            .unwrap_or_default()
    }
}
