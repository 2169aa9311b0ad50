//! `/datasets` namespace.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::{ApiClient, Query};

use super::segment;

/// Upload route for dataset archives.
pub const DATASET_UPLOAD_PATH: &str = "/datasets/upload";

/// Sensor recordings used as evaluation input.
#[derive(Debug, Clone)]
pub struct Datasets {
    api: ApiClient,
}

impl Datasets {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists datasets, filtered/paginated by `query`.
    pub async fn list(&self, query: &Query) -> Result<Value> {
        self.api.get("/datasets", query).await
    }

    /// Fetches dataset metadata.
    pub async fn get(&self, id: &str) -> Result<Value> {
        self.api
            .get(&format!("/datasets/{}", segment(id)), &Query::new())
            .await
    }

    /// Registers a dataset that already lives on the server.
    pub async fn create<B: Serialize + ?Sized>(&self, dataset: &B) -> Result<Value> {
        self.api.post("/datasets", dataset).await
    }

    /// Uploads a dataset archive, reporting progress in percent.
    pub async fn upload<P>(&self, path: impl AsRef<Path>, on_progress: P) -> Result<Value>
    where
        P: Fn(f64) + Send + Sync + 'static,
    {
        self.api
            .upload(DATASET_UPLOAD_PATH, path, on_progress)
            .await
    }

    /// Deletes a dataset.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        self.api.delete(&format!("/datasets/{}", segment(id))).await
    }
}
