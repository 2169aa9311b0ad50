//! Client facade.
//!
//! [`Client`] bundles the REST client, the realtime manager and the session
//! store built from one configuration. The parts are independent; the
//! facade only constructs them together.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::http::ApiClient;
use crate::realtime::WebSocketManager;
use crate::session::{AUTH_TOKEN_KEY, KeyValueStore, Preferences};

use super::builder::ClientBuilder;

// ============================================================================
// Client
// ============================================================================

/// OpenSLAM dashboard client.
///
/// # Example
///
/// ```no_run
/// use openslam_client::Client;
/// use openslam_client::realtime::events;
///
/// # async fn example() -> openslam_client::Result<()> {
/// let client = Client::builder().build()?;
///
/// let plugins = client.api().plugins().list().await?;
/// println!("{plugins}");
///
/// client.realtime().on(events::EVALUATION_COMPLETE, |payload| {
///     println!("done: {payload}");
/// });
/// client.realtime().connect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    api: ApiClient,
    realtime: WebSocketManager,
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api", &self.api)
            .field("realtime", &self.realtime)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Public API
// ============================================================================

impl Client {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        api: ApiClient,
        realtime: WebSocketManager,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            api,
            realtime,
            store,
        }
    }

    /// REST client.
    #[inline]
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Realtime manager.
    #[inline]
    #[must_use]
    pub fn realtime(&self) -> &WebSocketManager {
        &self.realtime
    }

    /// Session store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Typed preference accessors over the session store.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences::new(Arc::clone(&self.store))
    }

    /// Stores the bearer token sent with every subsequent request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the store cannot persist it.
    pub fn set_auth_token(&self, token: &str) -> Result<()> {
        self.store.set(AUTH_TOKEN_KEY, token)
    }

    /// Removes the stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the store cannot persist it.
    pub fn clear_auth_token(&self) -> Result<()> {
        self.store.remove(AUTH_TOKEN_KEY)
    }

    /// Returns `true` if a bearer token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.get(AUTH_TOKEN_KEY).is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
