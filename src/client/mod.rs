//! The object resolver — cache-resolution and request orchestration.
//!
//! [`Muninn`] decides, per request, whether to serve from the state
//! store, which namespace to consult, how to build the outbound
//! endpoint, how to merge paginated responses, and how to write results
//! back. Transport, deserialization, token exchange, and path
//! translation are collaborators behind narrow seams; the resolver only
//! sequences them.
//!
//! # Cache decision procedure
//!
//! - **no-store** (and not fetch-all): resolve index → assemble endpoint
//!   → fetch → deserialize, touching no object namespace.
//! - **resource by id**: resource cache, then (plain requests only) a
//!   scan of the cached collection, then the network; fetched resources
//!   are folded into the per-type resource map under their resource key.
//! - **collection**: served from cache unless a refresh is forced, the
//!   entry is missing, a projection is requested that the entry lacks,
//!   or a fetch-all finds unfetched pages in the entry's links.
//! - **by path**: the translation cache short-circuits the router
//!   endpoint; the translated id then re-enters the id-based flow.
//!
//! Overlapping resolves for the same key are not deduplicated — both may
//! fetch, and the last writer wins in the store.

mod builder;
mod request;

pub use builder::{MuninnBuilder, DEFAULT_API_PREFIX, DEFAULT_TOKEN_PATH};
pub use request::ObjectRequest;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::deserialize::deserialize;
use crate::endpoint::{assemble_api_root, assemble_endpoint, make_relative, ApiIndex};
use crate::error::ErrorHook;
use crate::fetch::translate_path::translate_path;
use crate::fetch::{fetch_document, FetchAdapter, RequestInit};
use crate::fetch::api_index::fetch_api_index;
use crate::pages::{has_more_pages, merge_page, next_link};
use crate::params::ApiParams;
use crate::query::{query_field_names, QueryBridge};
use crate::store::{CachedDocument, StateStore};
use crate::telemetry;
use crate::{MuninnError, Result};

use request::derive_key;

/// Cache-first client for a headless-CMS JSON:API backend.
///
/// Created through [`Muninn::builder()`]; owns the [`StateStore`] for
/// its lifetime.
pub struct Muninn {
    pub(crate) api_base: String,
    pub(crate) api_prefix: String,
    pub(crate) default_locale: Option<String>,
    pub(crate) fetcher: Arc<dyn FetchAdapter>,
    pub(crate) bridge: Arc<dyn QueryBridge>,
    pub(crate) auth: Option<Authenticator>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) debug: bool,
    pub(crate) no_store: bool,
    pub(crate) store: StateStore,
}

impl Muninn {
    /// Create a new builder for configuring a client.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }

    /// The owned state store, for subscriptions and inspection.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// The normalized API root: `<base>/[<locale>/]<prefix>/`.
    pub fn api_root(&self) -> String {
        assemble_api_root(
            &self.api_base,
            &self.api_prefix,
            self.default_locale.as_deref(),
        )
    }

    /// Resolve an object request against the store, fetching on miss.
    ///
    /// Returns the deserialized object graph (or the projected payload
    /// when a field-projection query is in effect).
    pub async fn get_object(&self, req: &ObjectRequest) -> Result<Value> {
        match self.resolve_object(req).await {
            Ok(value) => Ok(value),
            Err(err) => Err(self.report(err)),
        }
    }

    /// Resolve an object by a human-readable path.
    ///
    /// The path is translated to an entity id (cached under the
    /// path-translation namespace), then resolution continues as an
    /// id-based [`get_object`](Self::get_object). `req.id` is ignored.
    pub async fn get_object_by_path(&self, path: &str, req: &ObjectRequest) -> Result<Value> {
        match self.resolve_object_by_path(path, req).await {
            Ok(value) => Ok(value),
            Err(err) => Err(self.report(err)),
        }
    }

    /// The root resource-type index, fetched once and cached.
    pub async fn get_api_index(&self) -> Result<ApiIndex> {
        match self.resolve_index().await {
            Ok(index) => Ok(index),
            Err(err) => Err(self.report(err)),
        }
    }

    // =========================================================================
    // Internals — errors propagate unreported; the public entry points
    // above hand each one to the hook exactly once.
    // =========================================================================

    fn report(&self, err: MuninnError) -> MuninnError {
        warn!(error = %err, "object resolution failed");
        if let Some(hook) = &self.on_error {
            hook(&err);
        }
        err
    }

    async fn resolve_index(&self) -> Result<ApiIndex> {
        if let Some(index) = self.store.api_index() {
            return Ok(index);
        }
        let index = fetch_api_index(self.fetcher.as_ref(), &self.api_root()).await?;
        self.store.set_api_index(index.clone());
        Ok(index)
    }

    async fn resolve_object(&self, req: &ObjectRequest) -> Result<Value> {
        // Validate params before touching any state
        let param_qs = match &req.params {
            Some(params) => {
                let qs = params.query_string()?;
                if qs.is_empty() { None } else { Some(qs) }
            }
            None => None,
        };
        let collection_key = derive_key(&req.object_name, param_qs.as_deref());

        if self.no_store && !req.all {
            let fetched = self
                .fetch_object_document(req, req.id.as_deref(), param_qs.as_deref())
                .await?;
            return Ok(present(&fetched));
        }

        match &req.id {
            Some(id) => {
                self.resolve_resource(req, id, param_qs.as_deref(), &collection_key)
                    .await
            }
            None => {
                self.resolve_collection(req, param_qs.as_deref(), &collection_key)
                    .await
            }
        }
    }

    /// Resource-by-id resolution. In no-store mode every cache layer is
    /// skipped and nothing is written back.
    async fn resolve_resource(
        &self,
        req: &ObjectRequest,
        id: &str,
        param_qs: Option<&str>,
        collection_key: &str,
    ) -> Result<Value> {
        let resource_key = derive_key(id, param_qs);

        if !req.refresh && !self.no_store {
            if let Some(cached) = self.store.resource(&req.object_name, &resource_key) {
                if self.debug {
                    debug!(object = %req.object_name, id, "matched resource in state");
                }
                metrics::counter!(
                    telemetry::CACHE_HITS_TOTAL,
                    "object" => req.object_name.clone(),
                    "namespace" => "resource"
                )
                .increment(1);
                return Ok(present(&cached));
            }

            // A field-pruned collection cannot vouch for a complete
            // resource, so the scan is plain-request-only.
            if req.query.is_none() {
                if let Some(found) = self.find_in_collection(collection_key, id) {
                    if self.debug {
                        debug!(object = %req.object_name, id, "matched resource in collection");
                    }
                    metrics::counter!(
                        telemetry::CACHE_HITS_TOTAL,
                        "object" => req.object_name.clone(),
                        "namespace" => "collection"
                    )
                    .increment(1);
                    return Ok(deserialize(&found));
                }
            }
        }

        if self.debug {
            debug!(object = %req.object_name, id, "fetching resource and adding to state");
        }
        metrics::counter!(
            telemetry::CACHE_MISSES_TOTAL,
            "object" => req.object_name.clone(),
            "namespace" => "resource"
        )
        .increment(1);

        let fetched = self
            .fetch_object_document(req, Some(id), param_qs)
            .await?;

        if !self.no_store {
            // Spread the old map, overwrite only this key
            let mut resources = self.store.resources(&req.object_name).unwrap_or_default();
            resources.insert(resource_key, fetched.clone());
            self.store.set_resources(&req.object_name, resources);
        }

        Ok(present(&fetched))
    }

    /// Scan the cached collection for a resource id. Last match wins.
    fn find_in_collection(&self, collection_key: &str, id: &str) -> Option<Value> {
        let collection = self.store.collection(collection_key)?;
        let items = collection.document.get("data")?.as_array()?;
        let matched = items
            .iter()
            .rfind(|item| item.get("id").and_then(Value::as_str) == Some(id))?;
        Some(serde_json::json!({ "data": matched }))
    }

    /// Collection resolution (no id).
    async fn resolve_collection(
        &self,
        req: &ObjectRequest,
        param_qs: Option<&str>,
        collection_key: &str,
    ) -> Result<Value> {
        let cached = if self.no_store {
            None
        } else {
            self.store.collection(collection_key)
        };

        let needs_fetch = req.refresh
            || cached.is_none()
            || (req.query.is_some() && cached.as_ref().is_some_and(|c| c.projected.is_none()))
            || (req.all && cached.as_ref().is_some_and(|c| has_more_pages(&c.document)));

        if !needs_fetch {
            if self.debug {
                debug!(object = %req.object_name, "matched collection in state");
            }
            metrics::counter!(
                telemetry::CACHE_HITS_TOTAL,
                "object" => req.object_name.clone(),
                "namespace" => "collection"
            )
            .increment(1);
            // needs_fetch is false only when an entry exists
            let cached = cached.ok_or_else(|| {
                MuninnError::Configuration("collection entry vanished mid-resolve".to_string())
            })?;
            return Ok(present(&cached));
        }

        if self.debug {
            debug!(object = %req.object_name, "fetching collection and adding to state");
        }
        metrics::counter!(
            telemetry::CACHE_MISSES_TOTAL,
            "object" => req.object_name.clone(),
            "namespace" => "collection"
        )
        .increment(1);

        let mut fetched = self.fetch_object_document(req, None, param_qs).await?;
        if !self.no_store {
            // First page overwrites the entry wholesale
            self.store.set_collection(collection_key, fetched.clone());
        }

        if req.all {
            self.fetch_remaining_pages(req, collection_key, &mut fetched)
                .await?;
        }

        Ok(present(&fetched))
    }

    /// Follow `next` links until none remain, merging each page into the
    /// accumulated document (and cache, unless no-store).
    async fn fetch_remaining_pages(
        &self,
        req: &ObjectRequest,
        collection_key: &str,
        fetched: &mut CachedDocument,
    ) -> Result<()> {
        let mut previous: Option<String> = None;
        // has_more_pages treats next == self as the final page
        while has_more_pages(&fetched.document) {
            let next = match next_link(&fetched.document).map(String::from) {
                Some(next) => next,
                None => break,
            };
            // A server that repeats itself would otherwise loop forever
            if previous.as_deref() == Some(next.as_str()) {
                break;
            }

            let page = self.fetch_page(req, &next).await?;
            merge_page(&mut fetched.document, &page.document);
            merge_projected(&mut fetched.projected, page.projected);

            if !self.no_store {
                self.store.set_collection(collection_key, fetched.clone());
            }
            metrics::counter!(
                telemetry::PAGES_FETCHED_TOTAL,
                "object" => req.object_name.clone()
            )
            .increment(1);
            previous = Some(next);
        }
        Ok(())
    }

    /// Fetch one pagination page through the strategy the request is
    /// using (plain transport vs projection bridge).
    async fn fetch_page(&self, req: &ObjectRequest, url: &str) -> Result<CachedDocument> {
        let init = self.request_init(req).await?;
        match &req.query {
            None => {
                let document = fetch_document(self.fetcher.as_ref(), url, &init).await?;
                Ok(CachedDocument::plain(document))
            }
            Some(query) => {
                let relative =
                    make_relative(url, &self.api_base, self.default_locale.as_deref());
                let payload = self.bridge.fetch_projected(&relative, query, &init).await?;
                Ok(CachedDocument::with_projection(
                    payload.document,
                    payload.projected,
                ))
            }
        }
    }

    /// Resolve the index, assemble the endpoint, and fetch one document
    /// through the plain or projected strategy.
    async fn fetch_object_document(
        &self,
        req: &ObjectRequest,
        id: Option<&str>,
        param_qs: Option<&str>,
    ) -> Result<CachedDocument> {
        let index = self.resolve_index().await?;
        let entry = index
            .get(&req.object_name)
            .ok_or_else(|| MuninnError::UnknownObjectType(req.object_name.clone()))?;
        let init = self.request_init(req).await?;

        let fetched = match &req.query {
            None => {
                let endpoint = assemble_endpoint(entry, id, param_qs)?;
                let document = fetch_document(self.fetcher.as_ref(), &endpoint, &init).await;
                match document {
                    Ok(document) => Ok(CachedDocument::plain(document)),
                    Err(err) => Err(err),
                }
            }
            Some(query) => {
                // Field selections ride in the same query string, after
                // the caller's own directives
                let mut params = match &req.params {
                    Some(params) => params.into_params()?,
                    None => ApiParams::new(),
                };
                let fields = query_field_names(query);
                let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
                params.add_fields(&req.object_name, &field_refs);
                let qs = params.get_query_string();
                let endpoint = assemble_endpoint(entry, id, Some(&qs))?;
                let relative =
                    make_relative(&endpoint, &self.api_base, self.default_locale.as_deref());
                let payload = self.bridge.fetch_projected(&relative, query, &init).await?;
                Ok(CachedDocument::with_projection(
                    payload.document,
                    payload.projected,
                ))
            }
        };

        match &fetched {
            Ok(_) => metrics::counter!(
                telemetry::FETCHES_TOTAL,
                "object" => req.object_name.clone(),
                "status" => "ok"
            )
            .increment(1),
            Err(_) => metrics::counter!(
                telemetry::FETCHES_TOTAL,
                "object" => req.object_name.clone(),
                "status" => "error"
            )
            .increment(1),
        }
        fetched
    }

    /// By-path resolution: translation cache, router endpoint, then the
    /// id-based flow.
    async fn resolve_object_by_path(&self, path: &str, req: &ObjectRequest) -> Result<Value> {
        let cached = if req.refresh || self.no_store {
            None
        } else {
            self.store.path_translation(path)
        };

        let translation = match cached {
            Some(translation) => {
                if self.debug {
                    debug!(path, "matched path translation in state");
                }
                metrics::counter!(
                    telemetry::CACHE_HITS_TOTAL,
                    "object" => req.object_name.clone(),
                    "namespace" => "path"
                )
                .increment(1);
                translation
            }
            None => {
                let init = self.request_init(req).await?;
                let translation =
                    translate_path(self.fetcher.as_ref(), &self.api_base, path, &init).await?;
                if !self.no_store {
                    let mut translations = self.store.path_translations();
                    if req.refresh {
                        // Replace, never merge, the stale entry
                        translations.remove(path);
                    }
                    translations.insert(path.to_string(), translation.clone());
                    self.store.set_path_translations(translations);
                }
                translation
            }
        };

        let resolved = req.clone().id(translation.entity.uuid.clone());
        self.resolve_object(&resolved).await
    }

    /// Request options for an outbound fetch: the auth header when
    /// credentials are configured and the request is not anonymous.
    async fn request_init(&self, req: &ObjectRequest) -> Result<RequestInit> {
        match &self.auth {
            Some(auth) if !req.anonymous => {
                let header = auth.get_auth_header(self.fetcher.as_ref()).await?;
                Ok(RequestInit::get_with_headers(vec![(
                    "Authorization".to_string(),
                    header,
                )]))
            }
            _ => Ok(RequestInit::default()),
        }
    }
}

/// A cached document as the caller sees it: the projected payload when
/// one was computed, the deserialized graph otherwise.
fn present(cached: &CachedDocument) -> Value {
    match &cached.projected {
        Some(projected) => projected.clone(),
        None => deserialize(&cached.document),
    }
}

/// Concatenate projected collection pages; later non-array payloads
/// replace earlier ones.
fn merge_projected(into: &mut Option<Value>, page: Option<Value>) {
    match (into.as_mut(), page) {
        (Some(Value::Array(acc)), Some(Value::Array(items))) => acc.extend(items),
        (_, Some(page)) => *into = Some(page),
        _ => {}
    }
}
