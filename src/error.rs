//! Error types for the OpenSLAM client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use openslam_client::{Client, Error, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     match client.api().evaluations().get("999").await {
//!         Err(Error::Http { status: 404, message, .. }) => println!("missing: {message}"),
//!         other => println!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`], [`Error::InvalidHeader`] |
//! | HTTP | [`Error::Http`], [`Error::Network`], [`Error::Upload`] |
//! | Realtime | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::WebSocket`] |
//! | Storage | [`Error::Storage`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A configured or computed URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value is not valid on the wire.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// Offending header name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // HTTP Errors
    // ========================================================================
    /// The backend answered with a status outside 200..=299.
    ///
    /// `message` is the body's `message` field when present,
    /// otherwise `HTTP <status>`.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human readable message.
        message: String,
        /// Decoded response body.
        data: Value,
    },

    /// Transport-level HTTP failure (DNS, refused connection, broken body).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File upload failed.
    ///
    /// Every upload failure is normalized to this variant.
    #[error("Upload failed")]
    Upload {
        /// Response status, if the server answered at all.
        status: Option<u16>,
    },

    // ========================================================================
    // Realtime Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // Storage Errors
    // ========================================================================
    /// Session store could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid header error.
    #[inline]
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an HTTP status error from a decoded body.
    ///
    /// Uses the body's `message` field when it is a string.
    pub fn http(status: u16, data: Value) -> Self {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));

        Self::Http {
            status,
            message,
            data,
        }
    }

    /// Creates an upload error.
    #[inline]
    pub fn upload(status: Option<u16>) -> Self {
        Self::Upload { status }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a storage error.
    #[inline]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns the HTTP status carried by this error, if any.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Upload { status } => *status,
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the decoded response body for HTTP status errors.
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Http { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns `true` if this is a non-2xx HTTP response.
    #[inline]
    #[must_use]
    pub fn is_http_error(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Returns `true` for a 401 response.
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Returns `true` for a 404 response.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_) | Self::Network(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
