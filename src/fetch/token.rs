//! OAuth client-credentials token fetch.

use serde::{Deserialize, Serialize};

use super::{FetchAdapter, RequestInit};
use crate::{MuninnError, Result};

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// POST a client-credentials grant and parse the token response.
///
/// The body is form-encoded (`grant_type`/`client_id`/`client_secret`);
/// a non-success status maps to [`MuninnError::TokenFetch`].
pub async fn fetch_token(
    adapter: &dyn FetchAdapter,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse> {
    let body = format!(
        "grant_type=client_credentials&client_id={client_id}&client_secret={client_secret}"
    );
    let response = adapter.fetch(token_url, &RequestInit::form_post(body)).await?;
    if !response.ok() {
        return Err(MuninnError::TokenFetch {
            status: response.status,
        });
    }
    Ok(serde_json::from_value(response.body)?)
}
