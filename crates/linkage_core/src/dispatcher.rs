//! RequestDispatcher: path/query parsing, controller selection, handling.

use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::controller::{
    BaseController, ControllerResponse, HttpMethod, RelationshipsUpsert, UpsertStrategy,
};
use crate::error::LinkageError;
use crate::path::JsonPath;
use crate::query::{QueryParamsBuilder, RawQueryParams};
use crate::registry::ResourceRegistry;
use crate::request::RequestBody;
use crate::type_parser::TypeParser;

pub struct RequestDispatcher {
    controllers: Vec<Box<dyn BaseController>>,
    query_builder: QueryParamsBuilder,
}

impl RequestDispatcher {
    pub fn new(controllers: Vec<Box<dyn BaseController>>) -> Self {
        Self {
            controllers,
            query_builder: QueryParamsBuilder::new(),
        }
    }

    /// PATCH (replace) and POST (create) relationship upserts.
    pub fn for_relationships(registry: Arc<ResourceRegistry>, config: &DispatchConfig) -> Self {
        let parser = TypeParser::new();
        Self::new(vec![
            Box::new(RelationshipsUpsert::new(
                registry.clone(),
                parser,
                UpsertStrategy::replace(),
            )),
            Box::new(RelationshipsUpsert::new(
                registry,
                parser,
                config.create_strategy(),
            )),
        ])
    }

    /// First controller accepting `method` on `path`. Method names are
    /// case-sensitive; an unknown one matches no controller.
    pub fn get_controller(
        &self,
        path: &JsonPath,
        method: &str,
    ) -> Result<&dyn BaseController, LinkageError> {
        let not_found = || LinkageError::ControllerNotFound {
            method: method.to_string(),
            path: path_label(path),
        };

        let method: HttpMethod = method.parse().map_err(|e| {
            tracing::debug!(error = %e, "unsupported request method");
            not_found()
        })?;

        self.controllers
            .iter()
            .find(|controller| controller.is_acceptable(path, method.as_str()))
            .map(|controller| controller.as_ref())
            .ok_or_else(not_found)
    }

    pub async fn dispatch_request(
        &self,
        path: &str,
        method: &str,
        raw_params: &RawQueryParams,
        body: Option<&RequestBody>,
    ) -> Result<ControllerResponse, LinkageError> {
        let json_path = JsonPath::parse(path)?;
        let params = self.query_builder.build(raw_params)?;
        let controller = self.get_controller(&json_path, method)?;

        tracing::debug!(method, path, "dispatching request");
        let result = controller.handle(&json_path, &params, body).await;
        if let Err(e) = &result {
            tracing::debug!(method, path, status = e.http_status(), error = %e, "request rejected");
        }
        result
    }
}

fn path_label(path: &JsonPath) -> String {
    let mut label = format!("/{}", path.resource_type());
    if let Some(ids) = path.ids() {
        label.push('/');
        label.push_str(&ids.ids().join(","));
    }
    if let Some(element) = path.element_name() {
        if path.is_relationship() {
            label.push_str("/relationships");
        }
        label.push('/');
        label.push_str(element);
    }
    label
}
