//! HTTP client for the OpenSLAM REST API.
//!
//! # Pipeline
//!
//! ```text
//! endpoint + RequestConfig
//!   → merge over default headers
//!   → request interceptors (in order, awaited)
//!   → reqwest send
//!   → decode (JSON if Content-Type says so, text otherwise)
//!   → response interceptors (in order, awaited)
//!   → 2xx ? data : Error::Http { status, message, data }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | [`ApiClient`] and the verb helpers |
//! | `interceptor` | Interceptor traits and built-ins |
//! | `request` | Headers, request config, query strings |
//! | `response` | Response envelope and decoding |
//! | `upload` | Multipart upload with progress |

// ============================================================================
// Submodules
// ============================================================================

/// REST client.
pub mod client;

/// Interceptor traits and default interceptors.
pub mod interceptor;

/// Request descriptor types.
pub mod request;

/// Response envelope and decoding.
pub mod response;

/// Multipart upload.
pub mod upload;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ApiClient, default_headers};
pub use interceptor::{
    BearerTokenInterceptor, DEFAULT_LOGIN_ROUTE, RequestInterceptor, ResponseInterceptor,
    UnauthorizedInterceptor, request_fn, response_fn,
};
pub use request::{Headers, OutgoingRequest, Query, RequestBody, RequestConfig};
pub use response::ResponseEnvelope;
pub use upload::UPLOAD_FIELD;
