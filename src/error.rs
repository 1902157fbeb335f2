//! Muninn error types

use std::sync::Arc;

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Network/endpoint errors
    #[error("failed to fetch API index from {url} (status {status})")]
    IndexFetch { url: String, status: u16 },

    #[error("fetch failed for {url} (status {status})")]
    Fetch { url: String, status: u16 },

    #[error("token fetch failed (status {status})")]
    TokenFetch { status: u16 },

    #[error("path translation failed for {url} (status {status})")]
    PathTranslation { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(String),

    // Request/configuration errors
    #[error("object type '{0}' not found in API index")]
    UnknownObjectType(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("index entry has no usable URL: {0}")]
    InvalidIndexEntry(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;

/// Observer invoked with every fatal error before it is propagated.
///
/// The hook sees each error exactly once; propagation to the caller
/// happens regardless (the `Err` is returned after the hook runs). With
/// no hook configured, errors simply surface as `Err` — the equivalent
/// of a re-throwing default handler.
pub type ErrorHook = Arc<dyn Fn(&MuninnError) + Send + Sync>;
