//! Transport adapter and fetch helpers.
//!
//! The client never talks to the network directly; everything goes
//! through the [`FetchAdapter`] trait so tests (and consumers with
//! custom stacks) can substitute their own transport. [`HttpFetcher`]
//! is the default reqwest-backed implementation.

pub mod api_index;
pub mod token;
pub mod translate_path;

use async_trait::async_trait;
use serde_json::Value;

use crate::{MuninnError, Result};

/// HTTP method for a transport request. Only what the client needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// Request options handed to the transport adapter.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestInit {
    /// A GET request with the given headers.
    pub fn get_with_headers(headers: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Get,
            headers,
            body: None,
        }
    }

    /// A form-encoded POST request.
    pub fn form_post(body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }
}

/// Response surface the client consumes: a status code and a parsed
/// JSON body (`null` when the body is not JSON).
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Value,
}

impl FetchResponse {
    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pluggable transport. Implementations perform the actual network call
/// and surface transport-level failures as [`MuninnError::Http`].
#[async_trait]
pub trait FetchAdapter: Send + Sync {
    async fn fetch(&self, url: &str, init: &RequestInit) -> Result<FetchResponse>;
}

/// Default transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing reqwest client (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchAdapter for HttpFetcher {
    async fn fetch(&self, url: &str, init: &RequestInit) -> Result<FetchResponse> {
        let mut request = match init.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in &init.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &init.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| MuninnError::Http(format!("request to {url} failed: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| MuninnError::Http(format!("failed to read body from {url}: {e}")))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(FetchResponse { status, body })
    }
}

/// Fetch a JSON:API document, mapping non-success statuses to
/// [`MuninnError::Fetch`].
pub async fn fetch_document(
    adapter: &dyn FetchAdapter,
    url: &str,
    init: &RequestInit,
) -> Result<Value> {
    let response = adapter.fetch(url, init).await?;
    if !response.ok() {
        return Err(MuninnError::Fetch {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_covers_2xx_only() {
        let mk = |status| FetchResponse {
            status,
            body: Value::Null,
        };
        assert!(mk(200).ok());
        assert!(mk(204).ok());
        assert!(!mk(301).ok());
        assert!(!mk(404).ok());
        assert!(!mk(500).ok());
    }

    #[test]
    fn form_post_sets_content_type() {
        let init = RequestInit::form_post("a=b".to_string());
        assert_eq!(init.method, HttpMethod::Post);
        assert_eq!(
            init.headers,
            vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string()
            )]
        );
        assert_eq!(init.body.as_deref(), Some("a=b"));
    }
}
