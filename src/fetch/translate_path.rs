//! Path-to-entity translation via the decoupled router endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{FetchAdapter, RequestInit};
use crate::{MuninnError, Result};

/// A successful path translation. Only `entity.uuid` is consumed by the
/// client; everything else the endpoint returns is preserved for
/// subscribers inspecting the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedPath {
    pub entity: TranslatedEntity,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// The entity portion of a translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedEntity {
    pub uuid: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Build the translation endpoint URL for a path.
pub fn translate_path_url(api_base: &str, path: &str) -> String {
    let base = api_base.trim_end_matches('/');
    format!("{base}/router/translate-path?path={path}&_format=json")
}

/// Resolve a human-readable path to its entity identifier.
///
/// A non-success status, or a success response without a usable
/// `entity.uuid`, maps to [`MuninnError::PathTranslation`] — the caller
/// must not continue to an id-based fetch in either case.
pub async fn translate_path(
    adapter: &dyn FetchAdapter,
    api_base: &str,
    path: &str,
    init: &RequestInit,
) -> Result<TranslatedPath> {
    let url = translate_path_url(api_base, path);
    let response = adapter.fetch(&url, init).await?;
    if !response.ok() {
        return Err(MuninnError::PathTranslation {
            url,
            status: response.status,
        });
    }
    serde_json::from_value(response.body).map_err(|_| MuninnError::PathTranslation {
        url,
        status: response.status,
    })
}
