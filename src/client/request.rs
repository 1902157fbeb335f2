//! Request descriptors.

use crate::params::ObjectParams;

/// Describes one object resolution: a resource type, an optional id,
/// optional query parameters, and the flags steering cache behavior.
///
/// ```rust
/// # use muninn::ObjectRequest;
/// let req = ObjectRequest::new("node--recipe")
///     .id("33386d32-a87c-44b9-b66b-3dd0bfc38dca")
///     .refresh(true);
/// ```
#[derive(Debug, Clone)]
pub struct ObjectRequest {
    /// Resource type name, e.g. `node--recipe`.
    pub object_name: String,
    /// Resolve a single resource instead of the collection.
    pub id: Option<String>,
    /// Query parameters; part of the cache key.
    pub params: Option<ObjectParams>,
    /// GraphQL-shaped field-projection selection, e.g. `{ title id }`.
    pub query: Option<String>,
    /// Follow pagination links until the collection is complete.
    pub all: bool,
    /// Bypass every cache layer and force a fetch.
    pub refresh: bool,
    /// Skip the auth header even when credentials are configured.
    pub anonymous: bool,
}

impl ObjectRequest {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            id: None,
            params: None,
            query: None,
            all: false,
            refresh: false,
            anonymous: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn params(mut self, params: impl Into<ObjectParams>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }
}

/// Derive a cache key from a base (type name or id) and an optional
/// parameter string, so differently-parameterized fetches never collide.
pub(crate) fn derive_key(base: &str, query_string: Option<&str>) -> String {
    match query_string {
        Some(qs) if !qs.is_empty() => format!("{base}-{qs}"),
        _ => base.to_string(),
    }
}
