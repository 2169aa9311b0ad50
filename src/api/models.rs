//! Typed request bodies for the resource namespaces.
//!
//! Responses stay as [`serde_json::Value`]: the backend owns their shape.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// EvaluationRequest
// ============================================================================

/// Runs one plugin against one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Plugin name.
    pub plugin: String,
    /// Dataset identifier.
    pub dataset: String,
    /// Plugin-specific parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub parameters: Value,
}

impl EvaluationRequest {
    /// Creates a request without parameters.
    #[must_use]
    pub fn new(plugin: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            dataset: dataset.into(),
            parameters: Value::Null,
        }
    }

    /// Attaches plugin parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

// ============================================================================
// CompareRequest
// ============================================================================

/// Compares two or more stored results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRequest {
    /// Result identifiers to compare.
    pub result_ids: Vec<String>,
}

impl CompareRequest {
    /// Creates a comparison over `ids`.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            result_ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// BatchRequest
// ============================================================================

/// Cross product of plugins and datasets run as one batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Plugin names.
    pub plugins: Vec<String>,
    /// Dataset identifiers.
    pub datasets: Vec<String>,
    /// Parameters shared by every run.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub parameters: Value,
}

// ============================================================================
// ExportFormat
// ============================================================================

/// Result export format, used as the last path segment of the export route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// JSON document.
    Json,
    /// Comma separated metrics table.
    Csv,
    /// TUM trajectory format.
    Tum,
    /// KITTI trajectory format.
    Kitti,
}

impl ExportFormat {
    /// Path segment for this format.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Tum => "tum",
            Self::Kitti => "kitti",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tum" => Ok(Self::Tum),
            "kitti" => Ok(Self::Kitti),
            other => Err(Error::config(format!("Unsupported export format: {other}"))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
