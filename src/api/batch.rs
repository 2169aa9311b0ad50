//! `/batch` namespace.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::{ApiClient, Query};

use super::segment;

/// Batch jobs: many evaluations submitted together.
#[derive(Debug, Clone)]
pub struct Batch {
    api: ApiClient,
}

impl Batch {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists batch jobs.
    pub async fn list(&self) -> Result<Value> {
        self.api.get("/batch", &Query::new()).await
    }

    /// Fetches one batch with its per-run status.
    pub async fn get(&self, id: &str) -> Result<Value> {
        self.api
            .get(&format!("/batch/{}", segment(id)), &Query::new())
            .await
    }

    /// Submits a batch. See [`BatchRequest`](super::BatchRequest).
    pub async fn create<B: Serialize + ?Sized>(&self, batch: &B) -> Result<Value> {
        self.api.post("/batch", batch).await
    }

    /// Cancels a running batch.
    pub async fn cancel(&self, id: &str) -> Result<Value> {
        self.api
            .post_empty(&format!("/batch/{}/cancel", segment(id)))
            .await
    }
}
