//! Relationship linkage upserts: `POST` and `PATCH` on
//! `/{type}/{id}/relationships/{field}`.
//!
//! One algorithm, parameterised by an [`UpsertStrategy`]:
//!
//! 1. resolve the owner's registry entry
//! 2. require a body
//! 3. parse the owner id
//! 4. resolve the relationship field
//! 5. load the owner through its resource repository
//! 6-8. resolve target type, target id type and relationship repository
//! 9-10. check body cardinality against the field
//! 11-12. parse linkage ids and make exactly one repository call

use std::sync::Arc;

use async_trait::async_trait;

use super::{BaseController, ControllerResponse, HttpMethod};
use crate::error::{CardinalityMismatch, LinkageError};
use crate::path::JsonPath;
use crate::ports::{RelationshipRepository, ResourceInstance};
use crate::query::QueryParams;
use crate::registry::{RegistryEntry, ResourceRegistry};
use crate::request::{LinkageObject, RequestBody};
use crate::resource::RelationshipKind;
use crate::type_parser::{IdType, IdValue, ParseError, TypeParser};

/// How a to-many linkage is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToManyMode {
    /// Full replace via `set_relations`.
    Replace,
    /// Additive via `add_relations`.
    Append,
}

/// The verb a controller answers to and its to-many write mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertStrategy {
    method: HttpMethod,
    to_many: ToManyMode,
}

impl UpsertStrategy {
    /// `POST`; replaces to-many linkage unless switched to [`ToManyMode::Append`].
    pub const fn create() -> Self {
        Self {
            method: HttpMethod::Post,
            to_many: ToManyMode::Replace,
        }
    }

    /// `PATCH`; always a full replace.
    pub const fn replace() -> Self {
        Self {
            method: HttpMethod::Patch,
            to_many: ToManyMode::Replace,
        }
    }

    pub const fn with_to_many_mode(mut self, mode: ToManyMode) -> Self {
        self.to_many = mode;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn to_many_mode(&self) -> ToManyMode {
        self.to_many
    }
}

pub struct RelationshipsUpsert {
    registry: Arc<ResourceRegistry>,
    parser: TypeParser,
    strategy: UpsertStrategy,
}

impl RelationshipsUpsert {
    pub fn new(registry: Arc<ResourceRegistry>, parser: TypeParser, strategy: UpsertStrategy) -> Self {
        Self {
            registry,
            parser,
            strategy,
        }
    }

    pub fn post(registry: Arc<ResourceRegistry>, parser: TypeParser) -> Self {
        Self::new(registry, parser, UpsertStrategy::create())
    }

    pub fn patch(registry: Arc<ResourceRegistry>, parser: TypeParser) -> Self {
        Self::new(registry, parser, UpsertStrategy::replace())
    }

    pub fn strategy(&self) -> UpsertStrategy {
        self.strategy
    }

    fn entry(&self, resource_type: &str) -> Result<&RegistryEntry, LinkageError> {
        self.registry
            .get_entry(resource_type)
            .ok_or_else(|| LinkageError::ResourceNotFound(resource_type.to_string()))
    }

    async fn process_to_many(
        &self,
        repository: &dyn RelationshipRepository,
        source: &ResourceInstance,
        field_name: &str,
        id_type: IdType,
        linkages: &[LinkageObject],
    ) -> Result<(), LinkageError> {
        let raw_ids = linkages
            .iter()
            .map(|l| l.id().ok_or_else(|| ParseError::missing(id_type)))
            .collect::<Result<Vec<_>, _>>()?;
        let ids = self.parser.parse_all(raw_ids, id_type)?;
        let count = ids.len();

        match self.strategy.to_many {
            ToManyMode::Replace => repository.set_relations(source, ids, field_name).await?,
            ToManyMode::Append => repository.add_relations(source, ids, field_name).await?,
        }

        tracing::info!(
            method = %self.strategy.method,
            resource = %source.resource_type,
            id = %source.id,
            field = field_name,
            mode = ?self.strategy.to_many,
            count,
            "to-many relationship written"
        );
        Ok(())
    }

    async fn process_to_one(
        &self,
        repository: &dyn RelationshipRepository,
        source: &ResourceInstance,
        field_name: &str,
        id_type: IdType,
        linkage: Option<&LinkageObject>,
    ) -> Result<(), LinkageError> {
        let id: Option<IdValue> = linkage
            .and_then(LinkageObject::id)
            .map(|raw| self.parser.parse(raw, id_type))
            .transpose()?;
        let cleared = id.is_none();

        repository.set_relation(source, id, field_name).await?;

        tracing::info!(
            method = %self.strategy.method,
            resource = %source.resource_type,
            id = %source.id,
            field = field_name,
            cleared,
            "to-one relationship written"
        );
        Ok(())
    }
}

#[async_trait]
impl BaseController for RelationshipsUpsert {
    fn is_acceptable(&self, path: &JsonPath, request_type: &str) -> bool {
        !path.is_collection()
            && path.is_relationship()
            && self.strategy.method.as_str() == request_type
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> Result<ControllerResponse, LinkageError> {
        let method = self.strategy.method;
        let resource_type = path.resource_type();
        let entry = self.entry(resource_type)?;

        let body = body.ok_or_else(|| LinkageError::RequestBodyMissing {
            method,
            resource: resource_type.to_string(),
        })?;

        let information = entry.resource_information();
        let raw_id = path
            .ids()
            .and_then(|ids| ids.first())
            .ok_or_else(|| LinkageError::MissingResourceId(resource_type.to_string()))?;
        let resource_id = self.parser.parse(raw_id, information.id_type())?;

        let field_name = path.element_name().unwrap_or_default();
        let field = information
            .find_relationship_field_by_name(field_name)
            .ok_or_else(|| LinkageError::RelationshipFieldNotFound {
                resource: resource_type.to_string(),
                field: field_name.to_string(),
            })?;

        tracing::debug!(
            %method,
            resource = resource_type,
            id = %resource_id,
            field = field_name,
            "loading relationship owner"
        );
        let source = entry
            .resource_repository()
            .find_one(&resource_id, params)
            .await?;

        let target_type = field.target_type.as_str();
        let target_id_type = self.entry(target_type)?.resource_information().id_type();
        let repository = entry.relationship_repository_for(target_type).ok_or_else(|| {
            LinkageError::RelationshipRepositoryNotFound {
                owner: resource_type.to_string(),
                target: target_type.to_string(),
            }
        })?;

        match (field.kind, body) {
            (RelationshipKind::ToMany, RequestBody::Multiple(linkages)) => {
                self.process_to_many(repository, &source, field_name, target_id_type, linkages)
                    .await?;
            }
            (RelationshipKind::ToOne, RequestBody::Single(linkage)) => {
                self.process_to_one(
                    repository,
                    &source,
                    field_name,
                    target_id_type,
                    linkage.as_ref(),
                )
                .await?;
            }
            (RelationshipKind::ToMany, RequestBody::Single(_)) => {
                return Err(LinkageError::RequestBodyCardinalityMismatch {
                    method,
                    resource: resource_type.to_string(),
                    kind: CardinalityMismatch::NonMultipleData,
                });
            }
            (RelationshipKind::ToOne, RequestBody::Multiple(_)) => {
                return Err(LinkageError::RequestBodyCardinalityMismatch {
                    method,
                    resource: resource_type.to_string(),
                    kind: CardinalityMismatch::MultipleData,
                });
            }
        }

        Ok(ControllerResponse::NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryResourceRepository;
    use crate::path::PathIds;
    use crate::resource::ResourceInformation;

    fn registry() -> Arc<ResourceRegistry> {
        let tasks = ResourceInformation::builder("tasks", IdType::Long)
            .to_one("project", "projects")
            .build()
            .unwrap();
        Arc::new(
            ResourceRegistry::builder()
                .resource(tasks, Arc::new(MemoryResourceRepository::new("tasks")))
                .build()
                .unwrap(),
        )
    }

    fn relationship_path() -> JsonPath {
        JsonPath::relationship("tasks", PathIds::single("1"), "project")
    }

    #[test]
    fn patch_accepts_relationship_path() {
        let sut = RelationshipsUpsert::patch(registry(), TypeParser::new());
        assert!(sut.is_acceptable(&relationship_path(), "PATCH"));
        assert!(!sut.is_acceptable(&relationship_path(), "POST"));
    }

    #[test]
    fn post_accepts_relationship_path() {
        let sut = RelationshipsUpsert::post(registry(), TypeParser::new());
        assert!(sut.is_acceptable(&relationship_path(), "POST"));
        assert!(!sut.is_acceptable(&relationship_path(), "PATCH"));
    }

    #[test]
    fn collection_paths_are_denied() {
        let sut = RelationshipsUpsert::patch(registry(), TypeParser::new());
        assert!(!sut.is_acceptable(&JsonPath::collection("tasks"), "PATCH"));
        let several = JsonPath::relationship(
            "tasks",
            PathIds::new(vec!["1".into(), "2".into()]),
            "project",
        );
        assert!(!sut.is_acceptable(&several, "PATCH"));
    }

    #[test]
    fn non_relationship_paths_are_denied() {
        let sut = RelationshipsUpsert::patch(registry(), TypeParser::new());
        assert!(!sut.is_acceptable(&JsonPath::resource("tasks", PathIds::single("1")), "PATCH"));
        assert!(!sut.is_acceptable(
            &JsonPath::field("tasks", PathIds::single("1"), "project"),
            "PATCH"
        ));
    }

    #[test]
    fn acceptability_is_repeatable() {
        let sut = RelationshipsUpsert::patch(registry(), TypeParser::new());
        let path = relationship_path();
        let first = sut.is_acceptable(&path, "PATCH");
        assert_eq!(first, sut.is_acceptable(&path, "PATCH"));
    }

    #[test]
    fn strategies() {
        assert_eq!(UpsertStrategy::create().method(), HttpMethod::Post);
        assert_eq!(UpsertStrategy::replace().method(), HttpMethod::Patch);
        assert_eq!(UpsertStrategy::create().to_many_mode(), ToManyMode::Replace);
        assert_eq!(
            UpsertStrategy::create()
                .with_to_many_mode(ToManyMode::Append)
                .to_many_mode(),
            ToManyMode::Append
        );
    }
}
