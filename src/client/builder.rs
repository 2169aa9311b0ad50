//! Builder pattern for client configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use openslam_client::Client;
//! use openslam_client::session::FileStore;
//!
//! # fn example() -> openslam_client::Result<()> {
//! let client = Client::builder()
//!     .api_url("https://slam.example.org/api")
//!     .ws_url("wss://slam.example.org/ws")
//!     .store(Arc::new(FileStore::open_default()?))
//!     .navigator(Arc::new(|route: &str| println!("go to {route}")))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::http::{
    ApiClient, BearerTokenInterceptor, DEFAULT_LOGIN_ROUTE, RequestInterceptor,
    ResponseInterceptor, UnauthorizedInterceptor, default_headers,
};
use crate::realtime::{ReconnectPolicy, WebSocketManager};
use crate::session::{KeyValueStore, MemoryStore, Navigator, TracingNavigator};

use super::config::ClientConfig;
use super::core::Client;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`].
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Clone)]
pub struct ClientBuilder {
    api_url: String,
    ws_url: String,
    headers: Vec<(String, String)>,
    store: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    login_route: String,
    reconnect_policy: ReconnectPolicy,
    default_interceptors: bool,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    http: Option<reqwest::Client>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::from_config(ClientConfig::default())
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_url", &self.api_url)
            .field("ws_url", &self.ws_url)
            .field("login_route", &self.login_route)
            .field("reconnect_policy", &self.reconnect_policy)
            .field("default_interceptors", &self.default_interceptors)
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with the local development defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from `config`.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            api_url: config.api_url,
            ws_url: config.ws_url,
            headers: Vec::new(),
            store: None,
            navigator: None,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            reconnect_policy: config.reconnect_policy,
            default_interceptors: true,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            http: None,
        }
    }

    /// Creates a builder seeded from the `OPENSLAM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        ClientConfig::from_env().map(Self::from_config)
    }

    /// Sets the REST base URL.
    #[inline]
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the realtime socket URL.
    #[inline]
    #[must_use]
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    /// Adds or replaces a default header sent with every request.
    ///
    /// Validated by [`build`](Self::build).
    #[inline]
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the session store. Defaults to a fresh [`MemoryStore`].
    #[inline]
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the navigator used on forced logout. Defaults to [`TracingNavigator`].
    #[inline]
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Sets the route navigated to on 401.
    #[inline]
    #[must_use]
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Sets the realtime reconnect policy.
    #[inline]
    #[must_use]
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = policy;
        self
    }

    /// Skips the bearer-token and 401 interceptors.
    #[inline]
    #[must_use]
    pub fn without_default_interceptors(mut self) -> Self {
        self.default_interceptors = false;
        self
    }

    /// Appends a request interceptor after the defaults.
    #[inline]
    #[must_use]
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Appends a response interceptor after the defaults.
    #[inline]
    #[must_use]
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    /// Uses a preconfigured transport instead of a default one.
    #[inline]
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if a URL does not parse
    /// - [`Error::Config`] if a URL has the wrong scheme
    /// - [`Error::InvalidHeader`] if a default header is not valid on the wire
    /// - [`Error::Network`] if the default transport cannot be created
    pub fn build(self) -> Result<Client> {
        self.validate_api_url()?;
        self.validate_ws_url()?;

        let mut headers = default_headers();
        for (name, value) in &self.headers {
            headers.set(name, value)?;
        }

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder().build()?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(TracingNavigator));

        let api = ApiClient::with_parts(self.api_url, http, headers, Arc::clone(&store));

        if self.default_interceptors {
            api.add_request_interceptor(Arc::new(BearerTokenInterceptor::new(Arc::clone(
                &store,
            ))));
            api.add_response_interceptor(Arc::new(UnauthorizedInterceptor::new(
                Arc::clone(&store),
                navigator,
                self.login_route,
            )));
        }
        for interceptor in self.request_interceptors {
            api.add_request_interceptor(interceptor);
        }
        for interceptor in self.response_interceptors {
            api.add_response_interceptor(interceptor);
        }

        let realtime = WebSocketManager::with_policy(self.ws_url, self.reconnect_policy);

        debug!(api = %api.base_url(), ws = %realtime.url(), "Client built");
        Ok(Client::from_parts(api, realtime, store))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    fn validate_api_url(&self) -> Result<Url> {
        validate_scheme(&self.api_url, &["http", "https"], "API URL")
    }

    fn validate_ws_url(&self) -> Result<Url> {
        validate_scheme(&self.ws_url, &["ws", "wss"], "WebSocket URL")
    }
}

fn validate_scheme(raw: &str, allowed: &[&str], label: &str) -> Result<Url> {
    let url = Url::parse(raw)?;

    if !allowed.contains(&url.scheme()) {
        return Err(Error::config(format!(
            "{label} must use {}, got {:?}\n\
             Example: Client::builder().api_url(\"http://localhost:8000/api\")",
            allowed.join(" or "),
            url.scheme()
        )));
    }

    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
