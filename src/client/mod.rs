//! Client entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | REST client, realtime manager and session store |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientConfig`] | Endpoints and reconnect policy, optionally from the environment |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for client configuration.
pub mod builder;

/// Environment-driven configuration.
pub mod config;

/// Client facade.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_WS_URL};
pub use core::Client;
