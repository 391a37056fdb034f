//! Controllers: the routing contract between the transport and the core.
//!
//! The transport hands over an already-parsed [`JsonPath`], the verb name,
//! [`QueryParams`] and a decoded [`RequestBody`]; a controller answers with a
//! [`ControllerResponse`] or a typed [`LinkageError`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::LinkageError;
use crate::path::JsonPath;
use crate::query::QueryParams;
use crate::request::RequestBody;

pub mod relationships;

pub use relationships::{RelationshipsUpsert, ToManyMode, UpsertStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing HttpMethod
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method '{0}'")]
pub struct ParseMethodError(String);

impl FromStr for HttpMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

/// What a controller asks the transport to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerResponse {
    /// Success without a document body.
    NoContent,
}

impl ControllerResponse {
    pub fn http_status(&self) -> u16 {
        match self {
            ControllerResponse::NoContent => 204,
        }
    }
}

#[async_trait]
pub trait BaseController: Send + Sync {
    /// Whether this controller serves `request_type` on `path`.
    /// Must be pure; called repeatedly during controller selection.
    fn is_acceptable(&self, path: &JsonPath, request_type: &str) -> bool;

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> Result<ControllerResponse, LinkageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trip() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            assert_eq!(method.as_str().parse::<HttpMethod>().unwrap(), method);
        }
    }

    #[test]
    fn method_names_are_case_sensitive() {
        assert_eq!(
            "patch".parse::<HttpMethod>().unwrap_err(),
            ParseMethodError("patch".into())
        );
    }

    #[test]
    fn no_content_is_204() {
        assert_eq!(ControllerResponse::NoContent.http_status(), 204);
    }
}
