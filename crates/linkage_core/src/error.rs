use std::fmt;

use thiserror::Error;

use crate::controller::HttpMethod;
use crate::path::PathError;
use crate::query::QueryParamsError;
use crate::type_parser::ParseError;

/// Which way a request body disagrees with a relationship's cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityMismatch {
    /// To-many field, single linkage object in the body.
    NonMultipleData,
    /// To-one field, array of linkage objects in the body.
    MultipleData,
}

impl fmt::Display for CardinalityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardinalityMismatch::NonMultipleData => f.write_str("Non-multiple data in body"),
            CardinalityMismatch::MultipleData => f.write_str("Multiple data in body"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LinkageError {
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("request body not found: {method} {resource}")]
    RequestBodyMissing { method: HttpMethod, resource: String },

    #[error("relationship field not found: {resource}.{field}")]
    RelationshipFieldNotFound { resource: String, field: String },

    #[error("invalid request body for {method} {resource}: {kind}")]
    RequestBodyCardinalityMismatch {
        method: HttpMethod,
        resource: String,
        kind: CardinalityMismatch,
    },

    #[error(transparent)]
    IdentifierParse(#[from] ParseError),

    #[error("no relationship repository registered for {owner} -> {target}")]
    RelationshipRepositoryNotFound { owner: String, target: String },

    #[error("path does not address a single {0} resource")]
    MissingResourceId(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    QueryParams(#[from] QueryParamsError),

    #[error("no controller accepts {method} {path}")]
    ControllerNotFound { method: String, path: String },

    /// Failure raised by a repository implementation, passed through as-is.
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

impl LinkageError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ResourceNotFound(_) => 404,
            Self::RequestBodyMissing { .. } => 400,
            Self::RelationshipFieldNotFound { .. } => 404,
            Self::RequestBodyCardinalityMismatch { .. } => 400,
            Self::IdentifierParse(_) => 400,
            Self::RelationshipRepositoryNotFound { .. } => 500,
            Self::MissingResourceId(_) => 400,
            Self::Path(_) => 400,
            Self::QueryParams(_) => 400,
            Self::ControllerNotFound { .. } => 405,
            Self::Repository(_) => 500,
        }
    }
}

/// Startup failures while assembling resource metadata or the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("resource type registered twice: {0}")]
    DuplicateResource(String),

    #[error("relationship field declared twice on {resource}: {field}")]
    DuplicateField { resource: String, field: String },

    #[error("relationship repository {owner} -> {target} registered for unknown resource {owner}")]
    UnknownOwner { owner: String, target: String },
}
