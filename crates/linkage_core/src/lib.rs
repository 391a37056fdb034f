//! Linkage core: JSON:API relationship mutations.
//!
//! Accepts `POST`/`PATCH` on `/{type}/{id}/relationships/{field}`, resolves the
//! addressed resource and relationship field through a sealed
//! [`ResourceRegistry`], checks the body's cardinality against the field and
//! hands the parsed linkage ids to a pluggable [`RelationshipRepository`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Transport (out of scope): HTTP, JSON document decoding       │
//! └──────────────────────────────────────────────────────────────┘
//!                               │  path, verb, query map, body
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  RequestDispatcher                                            │
//! │    JsonPath::parse · QueryParamsBuilder · controller select   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  RelationshipsUpsert (PATCH replace / POST create)            │
//! │    ResourceRegistry · TypeParser · cardinality checks         │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Ports: ResourceRepository · RelationshipRepository           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let config = LinkageConfig::from_file("config/linkage.yaml")?;
//! let (registry, _links) = memory_registry(&config)?;
//! let dispatcher = RequestDispatcher::for_relationships(Arc::new(registry), &config.dispatch);
//!
//! let body = RequestBody::single(LinkageObject::new("projects", "4"));
//! dispatcher
//!     .dispatch_request("/tasks/1/relationships/project", "PATCH", &RawQueryParams::new(), Some(&body))
//!     .await?;
//! ```

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod memory;
pub mod path;
pub mod ports;
pub mod query;
pub mod registry;
pub mod request;
pub mod resource;
pub mod type_parser;

// Re-export main types
pub use config::{ConfigError, DispatchConfig, LinkageConfig};
pub use controller::{
    BaseController, ControllerResponse, HttpMethod, RelationshipsUpsert, ToManyMode,
    UpsertStrategy,
};
pub use dispatcher::RequestDispatcher;
pub use error::{CardinalityMismatch, LinkageError, RegistryError};
pub use memory::{memory_registry, MemoryRelationshipRepository, MemoryResourceRepository};
pub use path::{JsonPath, PathError, PathIds, PathKind};
pub use ports::{RelationshipRepository, ResourceInstance, ResourceRepository};
pub use query::{QueryParams, QueryParamsBuilder, QueryParamsError, RawQueryParams};
pub use registry::{RegistryEntry, ResourceRegistry, ResourceRegistryBuilder};
pub use request::{LinkageObject, RequestBody};
pub use resource::{RelationshipField, RelationshipKind, ResourceInformation};
pub use type_parser::{IdType, IdValue, ParseError, TypeParser};
