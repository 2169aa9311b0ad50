//! `/plugins` namespace.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::{ApiClient, Query};

use super::segment;

/// SLAM algorithm plugins registered with the backend.
#[derive(Debug, Clone)]
pub struct Plugins {
    api: ApiClient,
}

impl Plugins {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists installed plugins.
    pub async fn list(&self) -> Result<Value> {
        self.api.get("/plugins", &Query::new()).await
    }

    /// Fetches one plugin by name.
    pub async fn get(&self, name: &str) -> Result<Value> {
        self.api
            .get(&format!("/plugins/{}", segment(name)), &Query::new())
            .await
    }

    /// Registers a new plugin.
    pub async fn register<B: Serialize + ?Sized>(&self, plugin: &B) -> Result<Value> {
        self.api.post("/plugins", plugin).await
    }

    /// Starts an evaluation of `name` with the given configuration.
    ///
    /// The backend answers immediately; completion arrives as an
    /// `evaluation_complete` realtime event.
    pub async fn evaluate<B: Serialize + ?Sized>(&self, name: &str, config: &B) -> Result<Value> {
        self.api
            .post(&format!("/plugins/{}/evaluate", segment(name)), config)
            .await
    }
}
