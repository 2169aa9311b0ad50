//! Realtime event stream.
//!
//! A single reconnecting WebSocket carries `{type, payload}` frames from
//! the OpenSLAM backend. Listeners subscribe by event name.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `backoff` | Reconnect budget and exponential delays |
//! | `events` | Well-known event names |
//! | `listeners` | Listener registry and subscriptions |
//! | `manager` | [`WebSocketManager`] state machine |
//! | `message` | Frame wire format |
//!
//! # Local events
//!
//! | Event | Payload | When |
//! |-------|---------|------|
//! | `connect` | `null` | Socket opened |
//! | `disconnect` | `null` | Socket closed, or handshake failed |
//! | `error` | message string | Handshake or transport error |

// ============================================================================
// Submodules
// ============================================================================

/// Reconnect policy.
pub mod backoff;

/// Event name constants.
pub mod events;

/// Listener registry.
pub mod listeners;

/// Connection manager.
pub mod manager;

/// Wire frames.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use backoff::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, ReconnectPolicy};
pub use listeners::{Handler, ListenerRegistry, Subscription};
pub use manager::{ConnectionState, PendingReconnect, WebSocketManager};
pub use message::Frame;
