//! Event listener registry.
//!
//! Maps event names to ordered handler lists. Handlers for one event run
//! in insertion order. Dispatch snapshots the handler list first, so a
//! handler may subscribe or unsubscribe (itself included) while running.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::identifiers::ListenerId;

// ============================================================================
// Types
// ============================================================================

/// Realtime event callback. Receives the frame payload.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

type HandlerMap = FxHashMap<String, Vec<(ListenerId, Handler)>>;

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Event name → handlers.
#[derive(Default)]
pub struct ListenerRegistry {
    handlers: RwLock<HandlerMap>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read();
        let mut map = f.debug_map();
        for (event, list) in handlers.iter() {
            map.entry(event, &list.len());
        }
        map.finish()
    }
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `event` and returns its ID.
    pub fn add(&self, event: &str, handler: Handler) -> ListenerId {
        let id = ListenerId::next();
        self.handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes listener `id` from `event`. Returns `false` if it was not registered.
    pub fn remove(&self, event: &str, id: ListenerId) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(event) else {
            return false;
        };

        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;

        if list.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    /// Removes every handler of `event` that is the same allocation as `handler`.
    pub fn remove_handler(&self, event: &str, handler: &Handler) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(event) else {
            return false;
        };

        let before = list.len();
        list.retain(|(_, existing)| !Arc::ptr_eq(existing, handler));
        let removed = list.len() != before;

        if list.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    /// Invokes every handler of `event` with `payload`. Returns how many ran.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let snapshot: Vec<Handler> = match self.handlers.read().get(event) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return 0,
        };

        for handler in &snapshot {
            handler(payload);
        }

        trace!(event, listeners = snapshot.len(), "Dispatched event");
        snapshot.len()
    }

    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }

    /// Removes all handlers.
    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Disposer returned by [`WebSocketManager::on`](super::WebSocketManager::on).
///
/// Dropping it does not unsubscribe; call [`dispose`](Self::dispose).
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    event: String,
    id: ListenerId,
    disposed: AtomicBool,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new(registry: &Arc<ListenerRegistry>, event: &str, id: ListenerId) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            event: event.to_string(),
            id,
            disposed: AtomicBool::new(false),
        }
    }

    /// Event name this subscription listens to.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Listener ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Returns `true` once disposed.
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Unregisters the handler. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.event, self.id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |tag: &str| -> Handler {
            let sink = sink.clone();
            let tag = tag.to_string();
            Arc::new(move |payload: &Value| sink.lock().push(format!("{tag}:{payload}")))
        };
        (log, make)
    }

    #[test]
    fn test_emit_in_insertion_order() {
        let registry = ListenerRegistry::new();
        let (log, make) = recorder();

        registry.add("evaluation_complete", make("a"));
        registry.add("evaluation_complete", make("b"));
        registry.add("other", make("c"));

        let ran = registry.emit("evaluation_complete", &json!(1));

        assert_eq!(ran, 2);
        assert_eq!(*log.lock(), vec!["a:1".to_string(), "b:1".to_string()]);
    }

    #[test]
    fn test_emit_unknown_event_is_noop() {
        let registry = ListenerRegistry::new();
        assert_eq!(registry.emit("nothing", &Value::Null), 0);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = ListenerRegistry::new();
        assert!(!registry.remove("x", ListenerId::next()));

        let id = registry.add("x", Arc::new(|_: &Value| {}));
        assert!(!registry.remove("y", id));
        assert!(registry.remove("x", id));
        assert!(!registry.remove("x", id));
        assert_eq!(registry.count("x"), 0);
    }

    #[test]
    fn test_remove_handler_by_identity() {
        let registry = ListenerRegistry::new();
        let handler: Handler = Arc::new(|_: &Value| {});
        let other: Handler = Arc::new(|_: &Value| {});

        registry.add("x", handler.clone());
        registry.add("x", other.clone());

        assert!(registry.remove_handler("x", &handler));
        assert_eq!(registry.count("x"), 1);
        assert!(!registry.remove_handler("x", &handler));
    }

    #[test]
    fn test_subscription_dispose_idempotent() {
        let registry = Arc::new(ListenerRegistry::new());
        let id = registry.add("x", Arc::new(|_: &Value| {}));
        let sub = Subscription::new(&registry, "x", id);

        sub.dispose();
        sub.dispose();

        assert!(sub.is_disposed());
        assert_eq!(registry.count("x"), 0);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself() {
        let registry = Arc::new(ListenerRegistry::new());
        let calls = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let handler: Handler = {
            let calls = calls.clone();
            let slot = slot.clone();
            Arc::new(move |_: &Value| {
                *calls.lock() += 1;
                if let Some(sub) = slot.lock().as_ref() {
                    sub.dispose();
                }
            })
        };

        let id = registry.add("once", handler);
        *slot.lock() = Some(Subscription::new(&registry, "once", id));

        registry.emit("once", &Value::Null);
        registry.emit("once", &Value::Null);

        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_dispose_after_registry_dropped() {
        let registry = Arc::new(ListenerRegistry::new());
        let id = registry.add("x", Arc::new(|_: &Value| {}));
        let sub = Subscription::new(&registry, "x", id);
        drop(registry);
        sub.dispose();
        assert!(sub.is_disposed());
    }
}
