//! Root API index fetch.

use serde_json::Value;

use super::{FetchAdapter, RequestInit};
use crate::endpoint::ApiIndex;
use crate::{MuninnError, Result};

/// Fetch the resource-link index from the API root.
///
/// The index lives under the root document's `links` member; a response
/// without one is as unusable as a failed fetch.
pub async fn fetch_api_index(adapter: &dyn FetchAdapter, api_root: &str) -> Result<ApiIndex> {
    let response = adapter.fetch(api_root, &RequestInit::default()).await?;
    if !response.ok() {
        return Err(MuninnError::IndexFetch {
            url: api_root.to_string(),
            status: response.status,
        });
    }

    let links = response.body.get("links").cloned().unwrap_or(Value::Null);
    if links.is_null() {
        return Err(MuninnError::IndexFetch {
            url: api_root.to_string(),
            status: response.status,
        });
    }
    Ok(serde_json::from_value(links)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedFetcher(FetchResponse);

    #[async_trait]
    impl FetchAdapter for CannedFetcher {
        async fn fetch(&self, _url: &str, _init: &RequestInit) -> Result<FetchResponse> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn extracts_links_member() {
        let adapter = CannedFetcher(FetchResponse {
            status: 200,
            body: json!({
                "data": [],
                "links": {
                    "node--recipe": "https://x.test/jsonapi/node/recipe",
                    "node--page": {"href": "https://x.test/jsonapi/node/page"}
                }
            }),
        });
        let index = fetch_api_index(&adapter, "https://x.test/jsonapi/")
            .await
            .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index["node--recipe"].href().unwrap(),
            "https://x.test/jsonapi/node/recipe"
        );
        assert_eq!(
            index["node--page"].href().unwrap(),
            "https://x.test/jsonapi/node/page"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_index_fetch_error() {
        let adapter = CannedFetcher(FetchResponse {
            status: 503,
            body: Value::Null,
        });
        let err = fetch_api_index(&adapter, "https://x.test/jsonapi/")
            .await
            .unwrap_err();
        assert!(matches!(err, MuninnError::IndexFetch { status: 503, .. }));
    }

    #[tokio::test]
    async fn missing_links_is_index_fetch_error() {
        let adapter = CannedFetcher(FetchResponse {
            status: 200,
            body: json!({"data": []}),
        });
        let err = fetch_api_index(&adapter, "https://x.test/jsonapi/")
            .await
            .unwrap_err();
        assert!(matches!(err, MuninnError::IndexFetch { status: 200, .. }));
    }
}
