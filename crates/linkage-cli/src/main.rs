//! Linkage CLI
//!
//! Runs one relationship request against in-memory repositories seeded from
//! a YAML resource configuration, then prints the resulting linkage.
//!
//! # Usage
//!
//! ```bash
//! # Replace a to-one relationship
//! linkage /tasks/1/relationships/project --data '{"data": {"type": "projects", "id": "4"}}'
//!
//! # Add to a to-many relationship (replace unless append_on_create is set)
//! linkage -X POST /tasks/1/relationships/watchers --data '[{"type": "users", "id": "..."}]'
//!
//! # Clear a to-one relationship
//! linkage /tasks/1/relationships/project --data null
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkage_core::{
    memory_registry, JsonPath, LinkageConfig, MemoryRelationshipRepository, RawQueryParams,
    RequestBody, RequestDispatcher, ResourceRegistry, TypeParser,
};

/// Default configuration path
const DEFAULT_CONFIG_PATH: &str = "config/linkage.yaml";

#[derive(Parser)]
#[command(name = "linkage")]
#[command(version)]
#[command(about = "Apply a JSON:API relationship request to in-memory resources")]
struct Cli {
    /// Resource configuration file
    #[arg(long, env = "LINKAGE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Request method
    #[arg(short = 'X', long, default_value = "PATCH")]
    method: String,

    /// Request path, e.g. /tasks/1/relationships/project
    path: String,

    /// Request body: a JSON:API document or its bare `data` member
    #[arg(short, long)]
    data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_parser = parse_query_param)]
    query: Vec<(String, String)>,
}

fn parse_query_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn parse_body(raw: &str) -> anyhow::Result<RequestBody> {
    let value: serde_json::Value = serde_json::from_str(raw).context("request body is not JSON")?;
    let data = match value {
        serde_json::Value::Object(mut document) if document.contains_key("data") => document
            .remove("data")
            .unwrap_or(serde_json::Value::Null),
        other => other,
    };
    serde_json::from_value(data).context("request body is not resource linkage")
}

fn raw_params(pairs: Vec<(String, String)>) -> RawQueryParams {
    let mut params = RawQueryParams::new();
    for (key, value) in pairs {
        params.entry(key).or_insert_with(BTreeSet::new).insert(value);
    }
    params
}

/// Current linkage of the relationship addressed by `path`, as JSON.
fn current_linkage(
    registry: &ResourceRegistry,
    links: &MemoryRelationshipRepository,
    path: &str,
) -> anyhow::Result<serde_json::Value> {
    let path = JsonPath::parse(path)?;
    let entry = registry
        .get_entry(path.resource_type())
        .ok_or_else(|| anyhow!("unknown resource type {}", path.resource_type()))?;
    let raw_id = path
        .ids()
        .and_then(|ids| ids.first())
        .ok_or_else(|| anyhow!("path has no resource id"))?;
    let id = TypeParser::new().parse(raw_id, entry.resource_information().id_type())?;
    let field = path.element_name().unwrap_or_default();

    let linkage = links.linkage(path.resource_type(), &id, field)?;
    Ok(serde_json::to_value(linkage)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkage_core=info,linkage_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::info!(path = %cli.config.display(), "Loading configuration");
    let config = LinkageConfig::from_file(&cli.config)?;
    tracing::info!(
        resources = config.resources.len(),
        append_on_create = config.dispatch.append_on_create,
        "Configuration loaded"
    );

    let (registry, links) = memory_registry(&config)?;
    let registry = Arc::new(registry);
    let dispatcher = RequestDispatcher::for_relationships(registry.clone(), &config.dispatch);

    let body = cli.data.as_deref().map(parse_body).transpose()?;
    let params = raw_params(cli.query);

    match dispatcher
        .dispatch_request(&cli.path, &cli.method, &params, body.as_ref())
        .await
    {
        Ok(response) => {
            println!("{}", response.http_status());
            let linkage = current_linkage(&registry, &links, &cli.path)?;
            println!("{}", serde_json::to_string_pretty(&linkage)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", e.http_status());
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
