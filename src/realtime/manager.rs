//! Reconnecting WebSocket manager.
//!
//! Owns at most one socket at a time and fans inbound frames out to the
//! [`ListenerRegistry`].
//!
//! # State machine
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──open──► Connected
//!      ▲                          │                    │
//!      │                       failure               close
//!      │                          ▼                    ▼
//!      └──── reconnect task ◄── Disconnected ◄─────────┘
//!                                 │ budget spent
//!                                 ▼
//!                               GaveUp
//! ```
//!
//! # Socket task
//!
//! Each open socket is driven by a spawned task that `select!`s over the
//! inbound stream and an outbound command channel. Every task carries the
//! generation it was opened under; a task whose generation is no longer
//! current never touches state, dispatches frames or schedules a reconnect.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};

use super::backoff::ReconnectPolicy;
use super::events::{CONNECT, DISCONNECT, ERROR};
use super::listeners::{Handler, ListenerRegistry, Subscription};
use super::message::Frame;

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket.
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Socket open; `send` transmits.
    Connected,
    /// Reconnect budget exhausted. A manual `connect()` restores the full
    /// budget.
    GaveUp,
}

/// Commands for the socket task.
enum SocketCommand {
    /// Write one text frame.
    Send(String),
    /// Close the socket and exit without reconnecting.
    Close,
}

/// Live socket owned by the current generation.
struct SocketHandle {
    outbound: mpsc::UnboundedSender<SocketCommand>,
}

/// Mutable connection state, guarded by one lock.
struct ConnState {
    status: ConnectionState,
    attempts: u32,
    generation: u64,
    socket: Option<SocketHandle>,
}

// ============================================================================
// ReconnectTask
// ============================================================================

/// A scheduled reconnect attempt.
///
/// Aborted when a connection succeeds or `disconnect()` is called.
struct ReconnectTask {
    id: u64,
    attempt: u32,
    delay: Duration,
    handle: JoinHandle<()>,
}

impl ReconnectTask {
    fn cancel(self) {
        trace!(attempt = self.attempt, "Cancelling pending reconnect");
        self.handle.abort();
    }
}

/// Snapshot of a pending reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReconnect {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Delay the attempt was scheduled with.
    pub delay: Duration,
}

// ============================================================================
// ManagerInner
// ============================================================================

struct ManagerInner {
    url: String,
    policy: ReconnectPolicy,
    listeners: Arc<ListenerRegistry>,
    state: Mutex<ConnState>,
    reconnect: Mutex<Option<ReconnectTask>>,
    next_task_id: AtomicU64,
}

// ============================================================================
// WebSocketManager
// ============================================================================

/// Realtime client for the OpenSLAM event stream.
///
/// Cheap to clone; clones share the socket and the listener registry.
///
/// # Example
///
/// ```no_run
/// use openslam_client::realtime::{WebSocketManager, events};
///
/// # async fn example() -> openslam_client::Result<()> {
/// let ws = WebSocketManager::new("ws://localhost:8000/ws");
/// let sub = ws.on(events::EVALUATION_COMPLETE, |payload| {
///     println!("finished: {}", payload["name"]);
/// });
///
/// ws.connect().await?;
/// ws.send("subscribe", serde_json::json!({ "evaluation": "e1" }));
/// # sub.dispose();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WebSocketManager {
    inner: Arc<ManagerInner>,
}

impl fmt::Debug for WebSocketManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketManager")
            .field("url", &self.inner.url)
            .field("state", &self.state())
            .field("reconnect_attempts", &self.reconnect_attempts())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WebSocketManager - Construction & inspection
// ============================================================================

impl WebSocketManager {
    /// Creates a disconnected manager with the default reconnect policy.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_policy(url, ReconnectPolicy::default())
    }

    /// Creates a disconnected manager with a custom reconnect policy.
    #[must_use]
    pub fn with_policy(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                url: url.into(),
                policy,
                listeners: Arc::new(ListenerRegistry::new()),
                state: Mutex::new(ConnState {
                    status: ConnectionState::Disconnected,
                    attempts: 0,
                    generation: 0,
                    socket: None,
                }),
                reconnect: Mutex::new(None),
                next_task_id: AtomicU64::new(1),
            }),
        }
    }

    /// Socket URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Reconnect policy.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ReconnectPolicy {
        self.inner.policy
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().status
    }

    /// Returns `true` while the socket is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Consecutive failed attempts since the last successful connect, or
    /// since a manual connect out of `GaveUp`.
    #[inline]
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.state.lock().attempts
    }

    /// The reconnect currently waiting to fire, if any.
    #[must_use]
    pub fn pending_reconnect(&self) -> Option<PendingReconnect> {
        self.inner
            .reconnect
            .lock()
            .as_ref()
            .filter(|task| !task.handle.is_finished())
            .map(|task| PendingReconnect {
                attempt: task.attempt,
                delay: task.delay,
            })
    }

    /// Listener registry shared by all clones.
    #[inline]
    #[must_use]
    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.inner.listeners
    }
}

// ============================================================================
// WebSocketManager - Public API
// ============================================================================

impl WebSocketManager {
    /// Opens the socket.
    ///
    /// A no-op while already connected or connecting. On failure the
    /// `error` and `disconnect` events fire and a reconnect is scheduled
    /// according to the policy.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the handshake fails
    /// - [`Error::ConnectionClosed`] if `disconnect()` ran during the handshake
    pub async fn connect(&self) -> Result<()> {
        self.inner.open().await
    }

    /// Sends `{type, payload}` if connected.
    ///
    /// Returns `false` (and sends nothing) when not connected. Messages are
    /// never queued across reconnects.
    pub fn send<T: Serialize>(&self, event_type: &str, payload: T) -> bool {
        if !self.is_connected() {
            trace!(event_type, "Dropping send while not connected");
            return false;
        }

        let payload = match serde_json::to_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(event_type, error = %e, "Unserializable payload");
                return false;
            }
        };

        let text = match Frame::new(event_type, payload).to_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(event_type, error = %e, "Failed to encode frame");
                return false;
            }
        };

        let outbound = {
            let state = self.inner.state.lock();
            match &state.socket {
                Some(socket) if state.status == ConnectionState::Connected => {
                    socket.outbound.clone()
                }
                _ => {
                    trace!(event_type, "Connection dropped while encoding, discarding frame");
                    return false;
                }
            }
        };

        outbound.send(SocketCommand::Send(text)).is_ok()
    }

    /// Registers `handler` for `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_handler(event, Arc::new(handler))
    }

    /// Registers a shared handler for `event`.
    pub fn on_handler(&self, event: &str, handler: Handler) -> Subscription {
        let id = self.inner.listeners.add(event, handler);
        Subscription::new(&self.inner.listeners, event, id)
    }

    /// Removes the listener behind `subscription`. No-op if already removed.
    pub fn off(&self, subscription: &Subscription) {
        subscription.dispose();
    }

    /// Removes a shared handler from `event`. No-op if never registered.
    pub fn off_handler(&self, event: &str, handler: &Handler) {
        self.inner.listeners.remove_handler(event, handler);
    }

    /// Closes the socket and cancels any pending reconnect. Idempotent.
    ///
    /// Emits `disconnect` if a connection was open. Never schedules a
    /// reconnect.
    pub fn disconnect(&self) {
        self.inner.cancel_reconnect();

        let (socket, was_connected) = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.attempts = 0;
            let was_connected = state.status == ConnectionState::Connected;
            state.status = ConnectionState::Disconnected;
            (state.socket.take(), was_connected)
        };

        if let Some(socket) = socket {
            let _ = socket.outbound.send(SocketCommand::Close);
        }

        if was_connected {
            info!(url = %self.inner.url, "Disconnected by client");
            self.inner.listeners.emit(DISCONNECT, &Value::Null);
        }
    }
}

// ============================================================================
// ManagerInner - Connection lifecycle
// ============================================================================

impl ManagerInner {
    /// Performs one connection attempt.
    async fn open(self: &Arc<Self>) -> Result<()> {
        let generation = {
            let mut state = self.state.lock();
            match state.status {
                ConnectionState::Connected | ConnectionState::Connecting => {
                    debug!(status = ?state.status, "Connect ignored");
                    return Ok(());
                }
                ConnectionState::GaveUp => {
                    debug!(attempts = state.attempts, "Restoring reconnect budget");
                    state.attempts = 0;
                }
                ConnectionState::Disconnected => {}
            }
            state.generation += 1;
            state.status = ConnectionState::Connecting;
            state.generation
        };

        debug!(url = %self.url, generation, "Connecting");

        match connect_async(self.url.as_str()).await {
            Ok((stream, _response)) => {
                let (outbound, commands) = mpsc::unbounded_channel();
                {
                    let mut state = self.state.lock();
                    if state.generation != generation {
                        debug!(generation, "Handshake superseded, dropping socket");
                        return Err(Error::ConnectionClosed);
                    }
                    state.status = ConnectionState::Connected;
                    state.attempts = 0;
                    state.socket = Some(SocketHandle { outbound });
                }

                self.cancel_reconnect();
                info!(url = %self.url, "Connected");
                self.listeners.emit(CONNECT, &Value::Null);

                tokio::spawn(Self::run_socket(
                    Arc::clone(self),
                    generation,
                    stream,
                    commands,
                ));
                Ok(())
            }

            Err(e) => {
                let message = e.to_string();
                let current = {
                    let mut state = self.state.lock();
                    let current = state.generation == generation;
                    if current {
                        state.status = ConnectionState::Disconnected;
                    }
                    current
                };

                warn!(url = %self.url, error = %message, "Connection attempt failed");

                if current {
                    self.listeners.emit(ERROR, &Value::String(message.clone()));
                    self.listeners.emit(DISCONNECT, &Value::Null);
                    self.schedule_reconnect();
                }

                Err(Error::connection(message))
            }
        }
    }

    /// Socket event loop.
    async fn run_socket(
        self: Arc<Self>,
        generation: u64,
        stream: WsStream,
        mut commands: mpsc::UnboundedReceiver<SocketCommand>,
    ) {
        let (mut ws_write, mut ws_read) = stream.split();
        let mut closed_by_client = false;

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            if self.is_current(generation) {
                                self.dispatch(text.as_str());
                            }
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            if self.is_current(generation) {
                                self.listeners.emit(ERROR, &Value::String(e.to_string()));
                            }
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Binary, Ping, Pong, raw frames
                        Some(Ok(_)) => {}
                    }
                }

                command = commands.recv() => {
                    match command {
                        Some(SocketCommand::Send(text)) => {
                            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                warn!(error = %e, "Failed to write frame");
                                if self.is_current(generation) {
                                    self.listeners.emit(ERROR, &Value::String(e.to_string()));
                                }
                                break;
                            }
                        }

                        Some(SocketCommand::Close) | None => {
                            let _ = ws_write.close().await;
                            closed_by_client = true;
                            break;
                        }
                    }
                }
            }
        }

        if !closed_by_client {
            self.handle_close(generation);
        }

        debug!(generation, "Socket task terminated");
    }

    /// Parses and dispatches one inbound text frame.
    fn dispatch(&self, text: &str) {
        match Frame::parse(text) {
            Ok(frame) => {
                self.listeners.emit(&frame.event_type, &frame.payload);
            }
            Err(e) => {
                warn!(error = %e, text = %text, "Dropping malformed frame");
            }
        }
    }

    /// Close path for the current socket.
    fn handle_close(self: &Arc<Self>, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.status = ConnectionState::Disconnected;
            state.socket = None;
        }

        info!(url = %self.url, "Connection lost");
        self.listeners.emit(DISCONNECT, &Value::Null);
        self.schedule_reconnect();
    }

    /// Schedules the next reconnect, or gives up once the budget is spent.
    fn schedule_reconnect(self: &Arc<Self>) {
        let (attempt, delay) = {
            let mut state = self.state.lock();
            match self.policy.next_delay(state.attempts) {
                Some(delay) => {
                    state.attempts += 1;
                    (state.attempts, delay)
                }
                None => {
                    state.status = ConnectionState::GaveUp;
                    info!(
                        attempts = state.attempts,
                        max = self.policy.max_attempts,
                        "Reconnect budget exhausted, giving up"
                    );
                    return;
                }
            }
        };

        info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);

        // Hold the slot while spawning so the task cannot observe it early.
        let mut slot = self.reconnect.lock();
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.release_reconnect_slot(id);
            if let Err(e) = inner.open().await {
                debug!(attempt, error = %e, "Reconnect attempt failed");
            }
        });

        if let Some(previous) = slot.replace(ReconnectTask {
            id,
            attempt,
            delay,
            handle,
        }) {
            previous.cancel();
        }
    }

    /// Clears the reconnect slot if it still holds task `id`.
    fn release_reconnect_slot(&self, id: u64) {
        let mut slot = self.reconnect.lock();
        if slot.as_ref().is_some_and(|task| task.id == id) {
            slot.take();
        }
    }

    /// Aborts the pending reconnect, if any.
    fn cancel_reconnect(&self) {
        let task = self.reconnect.lock().take();
        if let Some(task) = task {
            task.cancel();
        }
    }

    #[inline]
    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicBool;

    use parking_lot::Mutex as PlMutex;

    /// Payload that records whether the state lock was free while it was
    /// being serialized.
    struct LockCheck {
        inner: Arc<ManagerInner>,
        unlocked: Arc<AtomicBool>,
    }

    impl Serialize for LockCheck {
        fn serialize<S: serde::Serializer>(
            &self,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            let free = self.inner.state.try_lock().is_some();
            self.unlocked.store(free, Ordering::SeqCst);
            serializer.serialize_unit()
        }
    }

    #[test]
    fn test_new_is_disconnected() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        assert_eq!(ws.state(), ConnectionState::Disconnected);
        assert!(!ws.is_connected());
        assert_eq!(ws.reconnect_attempts(), 0);
        assert!(ws.pending_reconnect().is_none());
        assert_eq!(ws.policy(), ReconnectPolicy::default());
    }

    #[test]
    fn test_send_while_disconnected_is_dropped() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        assert!(!ws.send("ping", Value::Null));
    }

    #[test]
    fn test_send_serializes_outside_state_lock() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        let (outbound, mut commands) = mpsc::unbounded_channel();
        {
            let mut state = ws.inner.state.lock();
            state.status = ConnectionState::Connected;
            state.socket = Some(SocketHandle { outbound });
        }

        let unlocked = Arc::new(AtomicBool::new(false));
        let payload = LockCheck {
            inner: Arc::clone(&ws.inner),
            unlocked: Arc::clone(&unlocked),
        };

        assert!(ws.send("ping", payload));
        assert!(unlocked.load(Ordering::SeqCst));

        match commands.try_recv() {
            Ok(SocketCommand::Send(text)) => {
                assert_eq!(text, r#"{"type":"ping","payload":null}"#);
            }
            _ => panic!("expected one outbound frame"),
        }
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn test_disconnect_is_idempotent_and_silent_when_idle() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        let fired = Arc::new(PlMutex::new(0));
        let counter = fired.clone();
        ws.on(DISCONNECT, move |_| *counter.lock() += 1);

        ws.disconnect();
        ws.disconnect();

        assert_eq!(*fired.lock(), 0);
        assert_eq!(ws.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_dispatch_routes_by_type_and_drops_garbage() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let sink = seen.clone();
        ws.on("evaluation_complete", move |payload| {
            sink.lock().push(payload.clone())
        });

        ws.inner
            .dispatch(r#"{"type":"evaluation_complete","payload":{"name":"run1"}}"#);
        ws.inner.dispatch("{broken");
        ws.inner.dispatch(r#"{"type":"evaluation_failed","payload":{}}"#);

        assert_eq!(*seen.lock(), vec![serde_json::json!({ "name": "run1" })]);
    }

    #[test]
    fn test_off_removes_listener() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        let sub = ws.on("x", |_| {});
        assert_eq!(ws.listeners().count("x"), 1);
        ws.off(&sub);
        ws.off(&sub);
        assert_eq!(ws.listeners().count("x"), 0);
    }

    #[test]
    fn test_off_handler_unknown_is_noop() {
        let ws = WebSocketManager::new("ws://127.0.0.1:1/ws");
        let handler: Handler = Arc::new(|_: &Value| {});
        ws.off_handler("x", &handler);

        ws.on_handler("x", handler.clone());
        ws.off_handler("x", &handler);
        assert_eq!(ws.listeners().count("x"), 0);
    }
}
