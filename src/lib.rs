//! OpenSLAM client - HTTP and realtime access to the evaluation dashboard backend.
//!
//! This library talks to an OpenSLAM backend over two channels: a REST API
//! for plugins, datasets, evaluations, results, batch jobs and system
//! settings, and a WebSocket stream of evaluation events.
//!
//! # Architecture
//!
//! ```text
//! Client ─┬─ ApiClient ──► interceptors ──► reqwest ──► REST backend
//!         ├─ WebSocketManager ◄──► tokio-tungstenite ◄──► event stream
//!         └─ KeyValueStore (auth token, preferences)
//! ```
//!
//! Key design principles:
//!
//! - Explicit instances, no globals
//! - Interceptors are async traits folded strictly in registration order
//! - Listeners are removed through disposers returned at subscription time
//! - Reconnects back off exponentially and are cancellable
//!
//! # Quick Start
//!
//! ```no_run
//! use openslam_client::{Client, Result};
//! use openslam_client::api::EvaluationRequest;
//! use openslam_client::realtime::events;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .api_url("http://localhost:8000/api")
//!         .ws_url("ws://localhost:8000/ws")
//!         .build()?;
//!
//!     client.realtime().on(events::EVALUATION_COMPLETE, |payload| {
//!         println!("evaluation finished: {payload}");
//!     });
//!     client.realtime().connect().await?;
//!
//!     let request = EvaluationRequest::new("orb_slam3", "euroc_mh01");
//!     client.api().evaluations().create(&request).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Resource namespaces over [`ApiClient`] |
//! | [`client`] | [`Client`] facade and [`ClientBuilder`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`http`] | REST client, interceptors, uploads |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`realtime`] | Reconnecting WebSocket manager |
//! | [`session`] | Session store, preferences, navigation hook |

// ============================================================================
// Modules
// ============================================================================

/// Resource namespaces: plugins, datasets, evaluations, results, batch, system.
pub mod api;

/// Client facade and configuration.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// REST client with interceptor pipeline.
pub mod http;

/// Type-safe identifiers.
pub mod identifiers;

/// Realtime event stream.
pub mod realtime;

/// Persisted client state.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder, ClientConfig};

// HTTP types
pub use http::{ApiClient, Headers, Query, RequestConfig, RequestInterceptor, ResponseInterceptor};

// Realtime types
pub use realtime::{ConnectionState, ReconnectPolicy, Subscription, WebSocketManager};

// Session types
pub use session::{FileStore, KeyValueStore, MemoryStore, Navigator, Preferences, Theme};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ListenerId, RequestId};
