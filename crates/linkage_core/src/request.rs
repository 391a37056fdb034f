//! Decoded relationship request bodies.

use serde::{Deserialize, Serialize};

/// Reference to another resource by type name and identifier text.
///
/// A missing or `null` id means "no target" and clears a to-one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
}

impl LinkageObject {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: Some(id.into()),
        }
    }

    /// Linkage naming only the target type.
    pub fn without_id(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// The `data` member of a relationship request: one linkage object (or
/// `null` to clear a to-one relation), or an array of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    Multiple(Vec<LinkageObject>),
    Single(Option<LinkageObject>),
}

impl RequestBody {
    pub fn single(linkage: LinkageObject) -> Self {
        RequestBody::Single(Some(linkage))
    }

    /// A `null` linkage; clears a to-one relation.
    pub fn null() -> Self {
        RequestBody::Single(None)
    }

    pub fn multiple(linkages: Vec<LinkageObject>) -> Self {
        RequestBody::Multiple(linkages)
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, RequestBody::Multiple(_))
    }
}
