//! Builder for configuring client instances.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::error::ErrorHook;
use crate::fetch::{FetchAdapter, HttpFetcher};
use crate::query::{ProjectionBridge, QueryBridge};
use crate::store::StateStore;
use crate::{Muninn, MuninnError, Result};

/// Default API path prefix.
pub const DEFAULT_API_PREFIX: &str = "jsonapi/";

/// Default token endpoint path under the API base.
pub const DEFAULT_TOKEN_PATH: &str = "oauth/token";

/// Builder for configuring client instances.
pub struct MuninnBuilder {
    api_base: Option<String>,
    api_prefix: String,
    default_locale: Option<String>,
    credentials: Option<(String, String)>,
    token_path: String,
    fetcher: Option<Arc<dyn FetchAdapter>>,
    bridge: Option<Arc<dyn QueryBridge>>,
    on_error: Option<ErrorHook>,
    debug: bool,
    no_store: bool,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            api_base: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            default_locale: None,
            credentials: None,
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            fetcher: None,
            bridge: None,
            on_error: None,
            debug: false,
            no_store: false,
        }
    }

    /// Base URL of the backend, e.g. `https://cms.example.com`.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// API path prefix (default `jsonapi/`). Slash variants normalize.
    pub fn api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }

    /// Locale segment inserted between the base and the prefix.
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// OAuth client-credentials pair. Requests pick up an
    /// `Authorization` header unless marked anonymous.
    pub fn credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.credentials = Some((client_id.into(), client_secret.into()));
        self
    }

    /// Token endpoint path under the API base (default `oauth/token`).
    pub fn token_path(mut self, token_path: impl Into<String>) -> Self {
        self.token_path = token_path.into();
        self
    }

    /// Substitute a custom transport.
    pub fn fetch_adapter(mut self, fetcher: Arc<dyn FetchAdapter>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Substitute a custom field-projection bridge.
    pub fn query_bridge(mut self, bridge: Arc<dyn QueryBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Observer invoked with every fatal error before it propagates.
    pub fn on_error(mut self, hook: impl Fn(&MuninnError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Emit cache-decision logs via `tracing`.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Disable caching: every resolve hits the network and object
    /// namespaces are never written.
    pub fn no_store(mut self, no_store: bool) -> Self {
        self.no_store = no_store;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Muninn> {
        let api_base = self
            .api_base
            .ok_or_else(|| MuninnError::Configuration("api_base is required".to_string()))?;

        let auth = self.credentials.map(|(id, secret)| {
            let token_url = format!(
                "{}/{}",
                api_base.trim_end_matches('/'),
                self.token_path.trim_matches('/')
            );
            Authenticator::new(id, secret, token_url)
        });

        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpFetcher::new()));
        let bridge = self
            .bridge
            .unwrap_or_else(|| Arc::new(ProjectionBridge::new(api_base.clone(), fetcher.clone())));

        Ok(Muninn {
            api_base,
            api_prefix: self.api_prefix,
            default_locale: self.default_locale,
            fetcher,
            bridge,
            auth,
            on_error: self.on_error,
            debug: self.debug,
            no_store: self.no_store,
            store: StateStore::new(),
        })
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
