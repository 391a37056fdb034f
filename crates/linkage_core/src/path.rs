//! Request path model.
//!
//! ```text
//! /tasks                               collection
//! /tasks/1                             resource       (ids may be "1,2")
//! /tasks/1/project                     field
//! /tasks/1/relationships/project       relationship
//! ```

use thiserror::Error;

const RELATIONSHIPS_SEGMENT: &str = "relationships";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty request path")]
    Empty,

    #[error("empty resource identifier in path: {0}")]
    EmptyIdentifier(String),

    #[error("relationship name missing in path: {0}")]
    MissingRelationshipName(String),

    #[error("unexpected path segments: {0}")]
    UnexpectedSegments(String),
}

/// Identifiers addressed by a path, in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIds {
    ids: Vec<String>,
}

impl PathIds {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn single(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn first(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Collection,
    Resource,
    Field,
    Relationship,
}

/// A parsed request path. Created per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    resource_type: String,
    ids: Option<PathIds>,
    element_name: Option<String>,
    kind: PathKind,
}

impl JsonPath {
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: None,
            element_name: None,
            kind: PathKind::Collection,
        }
    }

    pub fn resource(resource_type: impl Into<String>, ids: PathIds) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: Some(ids),
            element_name: None,
            kind: PathKind::Resource,
        }
    }

    pub fn field(
        resource_type: impl Into<String>,
        ids: PathIds,
        element_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: Some(ids),
            element_name: Some(element_name.into()),
            kind: PathKind::Field,
        }
    }

    pub fn relationship(
        resource_type: impl Into<String>,
        ids: PathIds,
        element_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: Some(ids),
            element_name: Some(element_name.into()),
            kind: PathKind::Relationship,
        }
    }

    pub fn parse(path: &str) -> Result<Self, PathError> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        let resource_type = segments[0];
        if resource_type.is_empty() {
            return Err(PathError::UnexpectedSegments(path.to_string()));
        }
        if segments.len() == 1 {
            return Ok(Self::collection(resource_type));
        }

        let ids = parse_ids(segments[1], path)?;
        match segments[2..] {
            [] => Ok(Self::resource(resource_type, ids)),
            [RELATIONSHIPS_SEGMENT] | [RELATIONSHIPS_SEGMENT, ""] => {
                Err(PathError::MissingRelationshipName(path.to_string()))
            }
            [RELATIONSHIPS_SEGMENT, name] => Ok(Self::relationship(resource_type, ids, name)),
            [name] if !name.is_empty() => Ok(Self::field(resource_type, ids, name)),
            _ => Err(PathError::UnexpectedSegments(path.to_string())),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn ids(&self) -> Option<&PathIds> {
        self.ids.as_ref()
    }

    pub fn element_name(&self) -> Option<&str> {
        self.element_name.as_deref()
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// True unless the path addresses exactly one identifier.
    pub fn is_collection(&self) -> bool {
        self.ids.as_ref().map_or(true, |ids| ids.len() != 1)
    }

    pub fn is_relationship(&self) -> bool {
        self.kind == PathKind::Relationship
    }
}

fn parse_ids(segment: &str, path: &str) -> Result<PathIds, PathError> {
    let ids: Vec<String> = segment.split(',').map(str::to_string).collect();
    if ids.iter().any(String::is_empty) {
        return Err(PathError::EmptyIdentifier(path.to_string()));
    }
    Ok(PathIds::new(ids))
}
