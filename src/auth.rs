//! OAuth client-credentials authentication.
//!
//! [`Authenticator`] caches one token and refreshes it through the token
//! endpoint when it is within 10 seconds of expiry. Only the formatted
//! `Authorization` header value leaves this module.

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::fetch::token::fetch_token;
use crate::fetch::FetchAdapter;
use crate::telemetry;
use crate::Result;

/// Refresh this long before the token actually expires.
const EXPIRY_SKEW_MS: u64 = 10_000;

#[derive(Debug, Default)]
struct TokenState {
    access_token: String,
    token_type: String,
    expires_at_ms: u64,
}

impl TokenState {
    fn is_valid(&self, now_ms: u64) -> bool {
        !self.access_token.is_empty() && self.expires_at_ms.saturating_sub(EXPIRY_SKEW_MS) > now_ms
    }

    fn header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Token cache for a client-credentials pair.
pub struct Authenticator {
    client_id: String,
    client_secret: String,
    token_url: String,
    state: RwLock<TokenState>,
}

impl Authenticator {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            state: RwLock::new(TokenState::default()),
        }
    }

    /// The `Authorization` header value, fetching or refreshing the
    /// token first when the cached one is missing or near expiry.
    pub async fn get_auth_header(&self, adapter: &dyn FetchAdapter) -> Result<String> {
        let now = now_ms();
        {
            let state = self.state.read().expect("token lock poisoned");
            if state.is_valid(now) {
                return Ok(state.header());
            }
        }

        debug!(token_url = %self.token_url, "fetching access token");
        let token = fetch_token(adapter, &self.token_url, &self.client_id, &self.client_secret)
            .await?;
        metrics::counter!(telemetry::TOKEN_REFRESHES_TOTAL).increment(1);

        let mut state = self.state.write().expect("token lock poisoned");
        *state = TokenState {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_at_ms: now + token.expires_in * 1000,
        };
        Ok(state.header())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
