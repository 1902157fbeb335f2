//! Field-projection queries.
//!
//! A request may carry a GraphQL-shaped selection body (`{ title id }`)
//! that narrows the response to the named fields. Projected fetches go
//! through the [`QueryBridge`] capability instead of the plain transport;
//! the orchestrator only ever sees the resulting
//! [`CachedDocument`](crate::store::CachedDocument)-shaped payload and is
//! unaware which strategy produced it. Bridges take *relative* endpoints
//! (the API base and locale segment stripped off).

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::fetch::{fetch_document, FetchAdapter, RequestInit};
use crate::Result;

/// Result of a projected fetch: the raw document (used for pagination
/// links and page merging) plus the projected object graph.
#[derive(Debug, Clone)]
pub struct ProjectedPayload {
    pub document: Value,
    pub projected: Value,
}

/// Fetch strategy for field-projection queries.
#[async_trait]
pub trait QueryBridge: Send + Sync {
    /// Fetch `relative_endpoint` and project the response down to the
    /// fields named in `query`.
    async fn fetch_projected(
        &self,
        relative_endpoint: &str,
        query: &str,
        init: &RequestInit,
    ) -> Result<ProjectedPayload>;
}

/// Extract the field names from a GraphQL-shaped selection body.
///
/// Braces, commas, and whitespace all separate tokens; duplicates are
/// dropped while preserving first-seen order.
pub fn query_field_names(query: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in query.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if token.is_empty() {
            continue;
        }
        if !names.iter().any(|n| n == token) {
            names.push(token.to_string());
        }
    }
    names
}

/// Default bridge: fetches through the transport against its own base
/// URL and prunes each resource to the requested fields locally.
pub struct ProjectionBridge {
    api_base: String,
    fetcher: Arc<dyn FetchAdapter>,
}

impl ProjectionBridge {
    pub fn new(api_base: impl Into<String>, fetcher: Arc<dyn FetchAdapter>) -> Self {
        Self {
            api_base: api_base.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl QueryBridge for ProjectionBridge {
    async fn fetch_projected(
        &self,
        relative_endpoint: &str,
        query: &str,
        init: &RequestInit,
    ) -> Result<ProjectedPayload> {
        let url = format!(
            "{}{relative_endpoint}",
            self.api_base.trim_end_matches('/')
        );
        let document = fetch_document(self.fetcher.as_ref(), &url, init).await?;
        let projected = project_document(&document, &query_field_names(query));
        Ok(ProjectedPayload {
            document,
            projected,
        })
    }
}

/// Project a JSON:API document down to the named fields.
///
/// Collections project to an array, single resources to an object. The
/// `id` is always kept so projected items stay addressable.
pub fn project_document(document: &Value, fields: &[String]) -> Value {
    match document.get("data") {
        Some(Value::Array(items)) => {
            Value::Array(items.iter().map(|item| project_resource(item, fields)).collect())
        }
        Some(item @ Value::Object(_)) => project_resource(item, fields),
        _ => Value::Null,
    }
}

fn project_resource(resource: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    if let Some(id) = resource.get("id") {
        out.insert("id".to_string(), id.clone());
    }
    let attributes = resource.get("attributes");
    for field in fields {
        if field == "id" {
            continue;
        }
        let value = attributes
            .and_then(|attrs| attrs.get(field))
            .or_else(|| resource.get(field));
        if let Some(value) = value {
            out.insert(field.clone(), value.clone());
        }
    }
    Value::Object(out)
}
