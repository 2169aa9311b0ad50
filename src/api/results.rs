//! `/results` namespace.

use serde_json::Value;

use crate::error::Result;
use crate::http::{ApiClient, Query};

use super::models::{CompareRequest, ExportFormat};
use super::segment;

/// Stored evaluation results.
#[derive(Debug, Clone)]
pub struct Results {
    api: ApiClient,
}

impl Results {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists results, filtered by `query` (e.g. `plugin`, `dataset`).
    pub async fn list(&self, query: &Query) -> Result<Value> {
        self.api.get("/results", query).await
    }

    /// Fetches one result with its metrics.
    pub async fn get(&self, id: &str) -> Result<Value> {
        self.api
            .get(&format!("/results/{}", segment(id)), &Query::new())
            .await
    }

    /// Computes a side-by-side comparison of `ids`.
    pub async fn compare<I, S>(&self, ids: I) -> Result<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api
            .post("/results/compare", &CompareRequest::new(ids))
            .await
    }

    /// Exports a result.
    ///
    /// Text formats (CSV, TUM, KITTI) come back as a JSON string value.
    pub async fn export(&self, id: &str, format: ExportFormat) -> Result<Value> {
        self.api
            .get(
                &format!("/results/{}/export/{}", segment(id), format.as_str()),
                &Query::new(),
            )
            .await
    }
}
