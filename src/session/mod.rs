//! Client session state.
//!
//! Everything the dashboard keeps between runs lives behind
//! [`KeyValueStore`]: the bearer token read by every HTTP request and a few
//! UI preferences.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `store` | Store trait, memory and file stores, well-known keys |
//! | `preferences` | Typed theme/sidebar/welcome accessors |
//! | `navigator` | Route navigation hook used on forced logout |

// ============================================================================
// Submodules
// ============================================================================

/// Route navigation hook.
pub mod navigator;

/// Typed preference accessors.
pub mod preferences;

/// Key/value persistence.
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use navigator::{Navigator, TracingNavigator};
pub use preferences::{Preferences, Theme};
pub use store::{
    AUTH_TOKEN_KEY, FileStore, HAS_SEEN_WELCOME_KEY, KeyValueStore, MemoryStore,
    SIDEBAR_COLLAPSED_KEY, THEME_KEY,
};
