//! REST client with interceptor pipeline.
//!
//! [`ApiClient`] resolves endpoints against a base URL, folds the request
//! interceptors over the outgoing request, decodes the body, folds the
//! response interceptors over the envelope, and turns non-2xx statuses into
//! [`Error::Http`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use openslam_client::http::{ApiClient, Query};
//! use openslam_client::session::MemoryStore;
//!
//! # async fn example() -> openslam_client::Result<()> {
//! let api = ApiClient::new("http://localhost:8000/api", Arc::new(MemoryStore::new()))?;
//! let datasets = api.get("/datasets", &Query::new().param("limit", 5)).await?;
//! println!("{datasets}");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::session::KeyValueStore;

use super::interceptor::{
    RequestInterceptor, ResponseInterceptor, run_request_chain, run_response_chain,
};
use super::request::{Headers, OutgoingRequest, Query, RequestBody, RequestConfig};
use super::response::{ResponseEnvelope, decode_body, is_success};

// ============================================================================
// Types
// ============================================================================

/// Shared state behind every [`ApiClient`] clone.
pub(crate) struct ApiInner {
    /// Prefix joined with every endpoint.
    pub base_url: String,

    /// Underlying HTTP transport.
    pub http: reqwest::Client,

    /// Headers sent unless the caller overrides them.
    pub default_headers: Headers,

    /// Request interceptors in registration order.
    pub request_interceptors: RwLock<Vec<Arc<dyn RequestInterceptor>>>,

    /// Response interceptors in registration order.
    pub response_interceptors: RwLock<Vec<Arc<dyn ResponseInterceptor>>>,

    /// Session store (read by the upload path for the bearer token).
    pub store: Arc<dyn KeyValueStore>,
}

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for the OpenSLAM REST API.
///
/// Cheap to clone; clones share interceptors and the connection pool.
/// Concurrent calls are independent: there is no queue, dedup or timeout.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) inner: Arc<ApiInner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field(
                "request_interceptors",
                &self.inner.request_interceptors.read().len(),
            )
            .field(
                "response_interceptors",
                &self.inner.response_interceptors.read().len(),
            )
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ApiClient - Construction
// ============================================================================

impl ApiClient {
    /// Creates a client with a default transport and no interceptors.
    ///
    /// Use [`Client::builder()`](crate::Client::builder) for the full setup
    /// with the default auth interceptors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_parts(
            base_url.into(),
            http,
            default_headers(),
            store,
        ))
    }

    /// Assembles a client from already-validated parts.
    pub(crate) fn with_parts(
        base_url: String,
        http: reqwest::Client,
        default_headers: Headers,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                base_url: base_url.trim_end_matches('/').to_string(),
                http,
                default_headers,
                request_interceptors: RwLock::new(Vec::new()),
                response_interceptors: RwLock::new(Vec::new()),
                store,
            }),
        }
    }

    /// Appends a request interceptor to the chain.
    pub fn add_request_interceptor(&self, interceptor: Arc<dyn RequestInterceptor>) {
        self.inner.request_interceptors.write().push(interceptor);
    }

    /// Appends a response interceptor to the chain.
    pub fn add_response_interceptor(&self, interceptor: Arc<dyn ResponseInterceptor>) {
        self.inner.response_interceptors.write().push(interceptor);
    }

    /// Returns the base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the session store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    /// Resolves `endpoint` against the base URL.
    #[inline]
    #[must_use]
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.inner.base_url, endpoint)
    }
}

// ============================================================================
// ApiClient - Request pipeline
// ============================================================================

impl ApiClient {
    /// Sends a request and returns the decoded body.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] for statuses outside 200..=299
    /// - [`Error::Network`] if the transport fails
    /// - [`Error::Json`] if a body declared as JSON does not parse
    /// - any error returned by an interceptor
    pub async fn request(&self, endpoint: &str, options: RequestConfig) -> Result<Value> {
        let request_id = RequestId::generate();

        let config = options.merged_over(&self.inner.default_headers);
        let request = OutgoingRequest::new(self.url_for(endpoint), config);

        let request_chain = self.inner.request_interceptors.read().clone();
        let request = run_request_chain(&request_chain, request).await?;

        let method = request.config.effective_method();
        debug!(%request_id, %method, url = %request.url, "Sending request");

        let mut builder = self
            .inner
            .http
            .request(method, &request.url)
            .headers(request.config.headers.into_header_map());
        if let Some(body) = request.config.body {
            builder = builder.body(body.into_bytes()?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = Headers::from(response.headers().clone());
        let bytes = response.bytes().await?;
        let data = decode_body(headers.get("content-type"), &bytes)?;

        let response_chain = self.inner.response_interceptors.read().clone();
        let envelope =
            run_response_chain(&response_chain, ResponseEnvelope::new(status, data, headers))
                .await?;

        debug!(%request_id, status = envelope.status, "Response received");

        if !is_success(envelope.status) {
            let err = Error::http(envelope.status, envelope.data);
            error!(%request_id, status = envelope.status, message = %err, "API request failed");
            return Err(err);
        }

        Ok(envelope.data)
    }

    /// `GET endpoint?query`.
    pub async fn get(&self, endpoint: &str, query: &Query) -> Result<Value> {
        self.request(&query.apply_to(endpoint), RequestConfig::new())
            .await
    }

    /// `POST` with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.send_json(Method::POST, endpoint, body).await
    }

    /// `POST` without a body.
    pub async fn post_empty(&self, endpoint: &str) -> Result<Value> {
        self.request(endpoint, RequestConfig::new().method(Method::POST))
            .await
    }

    /// `PUT` with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.send_json(Method::PUT, endpoint, body).await
    }

    /// `PATCH` with a JSON body.
    pub async fn patch<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.send_json(Method::PATCH, endpoint, body).await
    }

    /// `DELETE endpoint`.
    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(endpoint, RequestConfig::new().method(Method::DELETE))
            .await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<Value> {
        let config = RequestConfig::new()
            .method(method)
            .body(RequestBody::json(body)?);
        self.request(endpoint, config).await
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Headers every request starts from.
#[must_use]
pub fn default_headers() -> Headers {
    Headers::new().with(CONTENT_TYPE, HeaderValue::from_static("application/json"))
}

// ============================================================================
// Tests
// ============================================================================
