//! `/system` namespace.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::{ApiClient, Query};

/// Backend health and global settings.
#[derive(Debug, Clone)]
pub struct System {
    api: ApiClient,
}

impl System {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Worker/queue status.
    pub async fn status(&self) -> Result<Value> {
        self.api.get("/system/status", &Query::new()).await
    }

    /// Reads the global settings.
    pub async fn settings(&self) -> Result<Value> {
        self.api.get("/system/settings", &Query::new()).await
    }

    /// Replaces the global settings.
    pub async fn update_settings<B: Serialize + ?Sized>(&self, settings: &B) -> Result<Value> {
        self.api.put("/system/settings", settings).await
    }
}
