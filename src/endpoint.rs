//! Endpoint URL assembly.
//!
//! Pure functions that turn an index entry plus optional id and query
//! string into a fully-qualified request URL, and normalize the
//! base/prefix/locale configuration into the API root. Nothing here does
//! I/O.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{MuninnError, Result};

/// The root resource-type-to-URL index fetched from the API root.
pub type ApiIndex = HashMap<String, IndexEntry>;

/// One entry of the API index.
///
/// The wire format carries either a bare URL string or an object with an
/// `href` field; anything else is accepted at parse time but rejected
/// when resolved to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    /// Bare URL string form.
    Url(String),
    /// Object form carrying an `href`.
    Linked { href: String },
    /// Unusable shape, kept for diagnostics.
    Other(Value),
}

impl IndexEntry {
    /// Resolve the entry to a base URL.
    ///
    /// An empty string or an unrecognized shape is a precondition failure
    /// for the requested type.
    pub fn href(&self) -> Result<&str> {
        match self {
            IndexEntry::Url(url) if !url.is_empty() => Ok(url),
            IndexEntry::Linked { href } if !href.is_empty() => Ok(href),
            other => Err(MuninnError::InvalidIndexEntry(format!("{other:?}"))),
        }
    }
}

/// Build a request URL from an index entry, an optional id, and an
/// optional serialized query string.
///
/// The `?` separator is this function's responsibility; `query_string`
/// must not carry one.
pub fn assemble_endpoint(
    entry: &IndexEntry,
    id: Option<&str>,
    query_string: Option<&str>,
) -> Result<String> {
    let mut endpoint = entry.href()?.to_string();
    if let Some(id) = id {
        endpoint.push('/');
        endpoint.push_str(id);
    }
    if let Some(qs) = query_string {
        if !qs.is_empty() {
            endpoint.push('?');
            endpoint.push_str(qs);
        }
    }
    Ok(endpoint)
}

/// Assemble the API root from base, prefix, and optional default locale.
///
/// Normalizes slashes so any combination of leading/trailing variants
/// yields `<base>/[<locale>/]<prefix>/`. Pure and idempotent.
pub fn assemble_api_root(api_base: &str, api_prefix: &str, default_locale: Option<&str>) -> String {
    let base = api_base.trim_end_matches('/');
    let prefix = api_prefix.trim_start_matches('/').trim_end_matches('/');
    match default_locale {
        Some(locale) => format!("{base}/{locale}/{prefix}/"),
        None => format!("{base}/{prefix}/"),
    }
}

/// Rewrite an absolute endpoint to the relative form the query bridge
/// expects, stripping the API base and any locale segment.
///
/// Endpoints that do not start with the base are returned unchanged.
pub fn make_relative(endpoint: &str, api_base: &str, default_locale: Option<&str>) -> String {
    let base = api_base.trim_end_matches('/');
    let mut relative = match endpoint.strip_prefix(base) {
        Some(rest) => rest.to_string(),
        None => return endpoint.to_string(),
    };
    if let Some(locale) = default_locale {
        let segment = format!("/{locale}/");
        if let Some(rest) = relative.strip_prefix(&segment) {
            relative = format!("/{rest}");
        }
    }
    if !relative.starts_with('/') {
        relative.insert(0, '/');
    }
    relative
}
