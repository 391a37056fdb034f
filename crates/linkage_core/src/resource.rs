//! Resource metadata: per resource type, the identifier field and the
//! declared relationship fields.
//!
//! Built once through [`ResourceInformationBuilder`]; the relationship kind and
//! target type are recorded explicitly at registration, so nothing on the
//! request path inspects types at runtime.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::type_parser::IdType;

/// Cardinality of a relationship field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    ToOne,
    ToMany,
}

impl RelationshipKind {
    pub fn is_to_many(self) -> bool {
        matches!(self, RelationshipKind::ToMany)
    }
}

/// The identifier field of a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdField {
    pub name: String,
    pub id_type: IdType,
}

/// A declared relationship field and the resource type it links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipField {
    pub name: String,
    pub kind: RelationshipKind,
    pub target_type: String,
}

impl RelationshipField {
    pub fn to_one(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RelationshipKind::ToOne,
            target_type: target_type.into(),
        }
    }

    pub fn to_many(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RelationshipKind::ToMany,
            target_type: target_type.into(),
        }
    }
}

/// Type descriptor for one registered resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInformation {
    resource_type: String,
    id_field: IdField,
    relationship_fields: Vec<RelationshipField>,
}

impl ResourceInformation {
    pub fn builder(resource_type: impl Into<String>, id_type: IdType) -> ResourceInformationBuilder {
        ResourceInformationBuilder {
            resource_type: resource_type.into(),
            id_field: IdField {
                name: "id".to_string(),
                id_type,
            },
            relationship_fields: Vec::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id_field(&self) -> &IdField {
        &self.id_field
    }

    pub fn id_type(&self) -> IdType {
        self.id_field.id_type
    }

    pub fn relationship_fields(&self) -> &[RelationshipField] {
        &self.relationship_fields
    }

    pub fn find_relationship_field_by_name(&self, name: &str) -> Option<&RelationshipField> {
        self.relationship_fields.iter().find(|f| f.name == name)
    }
}

pub struct ResourceInformationBuilder {
    resource_type: String,
    id_field: IdField,
    relationship_fields: Vec<RelationshipField>,
}

impl ResourceInformationBuilder {
    /// Override the identifier field name (default `id`).
    pub fn id_field_name(mut self, name: impl Into<String>) -> Self {
        self.id_field.name = name.into();
        self
    }

    pub fn to_one(self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.relationship(RelationshipField::to_one(name, target_type))
    }

    pub fn to_many(self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.relationship(RelationshipField::to_many(name, target_type))
    }

    pub fn relationship(mut self, field: RelationshipField) -> Self {
        self.relationship_fields.push(field);
        self
    }

    /// Field names must be unique within the resource type.
    pub fn build(self) -> Result<ResourceInformation, RegistryError> {
        for (i, field) in self.relationship_fields.iter().enumerate() {
            if self.relationship_fields[..i]
                .iter()
                .any(|earlier| earlier.name == field.name)
            {
                return Err(RegistryError::DuplicateField {
                    resource: self.resource_type,
                    field: field.name.clone(),
                });
            }
        }

        Ok(ResourceInformation {
            resource_type: self.resource_type,
            id_field: self.id_field,
            relationship_fields: self.relationship_fields,
        })
    }
}
