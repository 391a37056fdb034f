//! Shared fixtures: a `tasks`/`projects` registry whose relationship
//! repository records every call.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use linkage_core::{
    IdType, IdValue, MemoryResourceRepository, RelationshipRepository, ResourceInformation,
    ResourceInstance, ResourceRegistry,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetRelation {
        source: ResourceInstance,
        target_id: Option<IdValue>,
        field: String,
    },
    SetRelations {
        source: ResourceInstance,
        target_ids: Vec<IdValue>,
        field: String,
    },
    AddRelations {
        source: ResourceInstance,
        target_ids: Vec<IdValue>,
        field: String,
    },
}

#[derive(Default)]
pub struct RecordingRelationshipRepository {
    calls: Mutex<Vec<Call>>,
}

impl RecordingRelationshipRepository {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RelationshipRepository for RecordingRelationshipRepository {
    async fn set_relation(
        &self,
        source: &ResourceInstance,
        target_id: Option<IdValue>,
        field_name: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::SetRelation {
            source: source.clone(),
            target_id,
            field: field_name.to_string(),
        });
        Ok(())
    }

    async fn set_relations(
        &self,
        source: &ResourceInstance,
        target_ids: Vec<IdValue>,
        field_name: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::SetRelations {
            source: source.clone(),
            target_ids,
            field: field_name.to_string(),
        });
        Ok(())
    }

    async fn add_relations(
        &self,
        source: &ResourceInstance,
        target_ids: Vec<IdValue>,
        field_name: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::AddRelations {
            source: source.clone(),
            target_ids,
            field: field_name.to_string(),
        });
        Ok(())
    }
}

/// Relationship repository that always fails.
pub struct FailingRelationshipRepository;

#[async_trait]
impl RelationshipRepository for FailingRelationshipRepository {
    async fn set_relation(
        &self,
        _: &ResourceInstance,
        _: Option<IdValue>,
        _: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }

    async fn set_relations(
        &self,
        _: &ResourceInstance,
        _: Vec<IdValue>,
        _: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }

    async fn add_relations(
        &self,
        _: &ResourceInstance,
        _: Vec<IdValue>,
        _: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }
}

/// Registry layout:
///
/// - `tasks` (long ids, task 1 stored)
///   - `project`  to-one  -> `projects`
///   - `projects` to-many -> `projects`
///   - `owner`    to-one  -> `users` (not registered)
///   - `tags`     to-many -> `tags`  (no relationship repository)
/// - `projects` (integer ids)
/// - `tags` (string ids)
pub fn registry_with(relationships: Arc<dyn RelationshipRepository>) -> Arc<ResourceRegistry> {
    let tasks = ResourceInformation::builder("tasks", IdType::Long)
        .to_one("project", "projects")
        .to_many("projects", "projects")
        .to_one("owner", "users")
        .to_many("tags", "tags")
        .build()
        .unwrap();
    let projects = ResourceInformation::builder("projects", IdType::Integer)
        .build()
        .unwrap();
    let tags = ResourceInformation::builder("tags", IdType::String)
        .build()
        .unwrap();

    let task_repository = MemoryResourceRepository::new("tasks");
    task_repository.insert(IdValue::Long(1)).unwrap();

    Arc::new(
        ResourceRegistry::builder()
            .resource(tasks, Arc::new(task_repository))
            .resource(projects, Arc::new(MemoryResourceRepository::new("projects")))
            .resource(tags, Arc::new(MemoryResourceRepository::new("tags")))
            .relationship_repository("tasks", "projects", relationships.clone())
            .relationship_repository("tasks", "users", relationships)
            .build()
            .unwrap(),
    )
}

pub fn recording_registry() -> (Arc<ResourceRegistry>, Arc<RecordingRelationshipRepository>) {
    let recorder = Arc::new(RecordingRelationshipRepository::default());
    let registry = registry_with(recorder.clone());
    (registry, recorder)
}

pub fn task(id: i64) -> ResourceInstance {
    ResourceInstance::new("tasks", id)
}
