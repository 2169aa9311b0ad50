//! Request and response interceptors.
//!
//! Interceptors are registered once at startup and run in registration
//! order on every call. Each one is fully awaited before the next starts.
//! Returning `Ok(None)` keeps the current value; `Ok(Some(_))` replaces it;
//! `Err(_)` aborts the call.
//!
//! # Built-in interceptors
//!
//! | Interceptor | Stage | Behaviour |
//! |-------------|-------|-----------|
//! | [`BearerTokenInterceptor`] | request | Adds `Authorization: Bearer <auth_token>` |
//! | [`UnauthorizedInterceptor`] | response | On 401, clears the token and navigates to the login route |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::{AUTH_TOKEN_KEY, KeyValueStore, Navigator};

use super::request::OutgoingRequest;
use super::response::ResponseEnvelope;

// ============================================================================
// Constants
// ============================================================================

/// Route the default 401 handler navigates to.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

// ============================================================================
// Traits
// ============================================================================

/// Inspects or replaces a request before it is sent.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Returns a replacement request, or `None` to keep `request`.
    async fn intercept(&self, request: &OutgoingRequest) -> Result<Option<OutgoingRequest>>;
}

/// Inspects or replaces a decoded response.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// Returns a replacement envelope, or `None` to keep `response`.
    async fn intercept(&self, response: &ResponseEnvelope) -> Result<Option<ResponseEnvelope>>;
}

// ============================================================================
// Sequential folds
// ============================================================================

/// Folds `interceptors` over `request` in order.
pub async fn run_request_chain(
    interceptors: &[Arc<dyn RequestInterceptor>],
    mut request: OutgoingRequest,
) -> Result<OutgoingRequest> {
    for interceptor in interceptors {
        if let Some(replacement) = interceptor.intercept(&request).await? {
            request = replacement;
        }
    }
    Ok(request)
}

/// Folds `interceptors` over `response` in order.
pub async fn run_response_chain(
    interceptors: &[Arc<dyn ResponseInterceptor>],
    mut response: ResponseEnvelope,
) -> Result<ResponseEnvelope> {
    for interceptor in interceptors {
        if let Some(replacement) = interceptor.intercept(&response).await? {
            response = replacement;
        }
    }
    Ok(response)
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Request interceptor backed by a synchronous closure.
pub struct RequestFn<F>(F);

/// Response interceptor backed by a synchronous closure.
pub struct ResponseFn<F>(F);

/// Wraps a closure as a [`RequestInterceptor`].
#[inline]
pub fn request_fn<F>(f: F) -> Arc<dyn RequestInterceptor>
where
    F: Fn(&OutgoingRequest) -> Option<OutgoingRequest> + Send + Sync + 'static,
{
    Arc::new(RequestFn(f))
}

/// Wraps a closure as a [`ResponseInterceptor`].
#[inline]
pub fn response_fn<F>(f: F) -> Arc<dyn ResponseInterceptor>
where
    F: Fn(&ResponseEnvelope) -> Option<ResponseEnvelope> + Send + Sync + 'static,
{
    Arc::new(ResponseFn(f))
}

#[async_trait]
impl<F> RequestInterceptor for RequestFn<F>
where
    F: Fn(&OutgoingRequest) -> Option<OutgoingRequest> + Send + Sync,
{
    async fn intercept(&self, request: &OutgoingRequest) -> Result<Option<OutgoingRequest>> {
        Ok((self.0)(request))
    }
}

#[async_trait]
impl<F> ResponseInterceptor for ResponseFn<F>
where
    F: Fn(&ResponseEnvelope) -> Option<ResponseEnvelope> + Send + Sync,
{
    async fn intercept(&self, response: &ResponseEnvelope) -> Result<Option<ResponseEnvelope>> {
        Ok((self.0)(response))
    }
}

// ============================================================================
// BearerTokenInterceptor
// ============================================================================

/// Attaches the stored bearer token to every request.
///
/// The token is read from the store on each call, never cached.
pub struct BearerTokenInterceptor {
    store: Arc<dyn KeyValueStore>,
}

impl BearerTokenInterceptor {
    /// Creates the interceptor over `store`.
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestInterceptor for BearerTokenInterceptor {
    async fn intercept(&self, request: &OutgoingRequest) -> Result<Option<OutgoingRequest>> {
        let Some(token) = self.store.get(AUTH_TOKEN_KEY) else {
            return Ok(None);
        };

        let mut request = request.clone();
        request
            .config
            .headers
            .set("Authorization", &format!("Bearer {token}"))?;
        Ok(Some(request))
    }
}

// ============================================================================
// UnauthorizedInterceptor
// ============================================================================

/// Forces a logout when the backend answers 401.
///
/// The envelope is left untouched so the caller still sees the error.
pub struct UnauthorizedInterceptor {
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl UnauthorizedInterceptor {
    /// Creates the interceptor.
    #[inline]
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            login_route: login_route.into(),
        }
    }
}

#[async_trait]
impl ResponseInterceptor for UnauthorizedInterceptor {
    async fn intercept(&self, response: &ResponseEnvelope) -> Result<Option<ResponseEnvelope>> {
        if response.status == 401 {
            debug!(route = %self.login_route, "Unauthorized response, clearing session");
            if let Err(e) = self.store.remove(AUTH_TOKEN_KEY) {
                warn!(error = %e, "Failed to clear stored auth token");
            }
            self.navigator.navigate(&self.login_route);
        }
        Ok(None)
    }
}

// ============================================================================
// Tests
// ============================================================================
