//! `/evaluations` namespace.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::{ApiClient, Query};

use super::segment;

/// Evaluation jobs.
#[derive(Debug, Clone)]
pub struct Evaluations {
    api: ApiClient,
}

impl Evaluations {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists evaluations, filtered by `query`.
    pub async fn list(&self, query: &Query) -> Result<Value> {
        self.api.get("/evaluations", query).await
    }

    /// Fetches one evaluation.
    pub async fn get(&self, id: &str) -> Result<Value> {
        self.api
            .get(&format!("/evaluations/{}", segment(id)), &Query::new())
            .await
    }

    /// Queues a new evaluation. See [`EvaluationRequest`](super::EvaluationRequest).
    pub async fn create<B: Serialize + ?Sized>(&self, evaluation: &B) -> Result<Value> {
        self.api.post("/evaluations", evaluation).await
    }

    /// Deletes an evaluation.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        self.api
            .delete(&format!("/evaluations/{}", segment(id)))
            .await
    }
}
