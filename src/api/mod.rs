//! Resource namespaces.
//!
//! Each namespace is a cheap handle over a shared [`ApiClient`] that maps
//! dashboard operations onto fixed backend paths. They add no logic of
//! their own beyond path building.
//!
//! | Namespace | Prefix |
//! |-----------|--------|
//! | [`Plugins`] | `/plugins` |
//! | [`Datasets`] | `/datasets` |
//! | [`Evaluations`] | `/evaluations` |
//! | [`Results`] | `/results` |
//! | [`Batch`] | `/batch` |
//! | [`System`] | `/system` |

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use crate::http::ApiClient;

// ============================================================================
// Submodules
// ============================================================================

/// Batch job namespace.
pub mod batch;

/// Dataset namespace.
pub mod datasets;

/// Evaluation namespace.
pub mod evaluations;

/// Typed request bodies.
pub mod models;

/// Plugin namespace.
pub mod plugins;

/// Result namespace.
pub mod results;

/// System namespace.
pub mod system;

// ============================================================================
// Re-exports
// ============================================================================

pub use batch::Batch;
pub use datasets::Datasets;
pub use evaluations::Evaluations;
pub use models::{BatchRequest, CompareRequest, EvaluationRequest, ExportFormat};
pub use plugins::Plugins;
pub use results::Results;
pub use system::System;

// ============================================================================
// ApiClient - Namespace accessors
// ============================================================================

impl ApiClient {
    /// `/plugins` operations.
    #[inline]
    #[must_use]
    pub fn plugins(&self) -> Plugins {
        Plugins::new(self.clone())
    }

    /// `/datasets` operations.
    #[inline]
    #[must_use]
    pub fn datasets(&self) -> Datasets {
        Datasets::new(self.clone())
    }

    /// `/evaluations` operations.
    #[inline]
    #[must_use]
    pub fn evaluations(&self) -> Evaluations {
        Evaluations::new(self.clone())
    }

    /// `/results` operations.
    #[inline]
    #[must_use]
    pub fn results(&self) -> Results {
        Results::new(self.clone())
    }

    /// `/batch` operations.
    #[inline]
    #[must_use]
    pub fn batch(&self) -> Batch {
        Batch::new(self.clone())
    }

    /// `/system` operations.
    #[inline]
    #[must_use]
    pub fn system(&self) -> System {
        System::new(self.clone())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Percent-encodes a caller-supplied path segment.
#[inline]
pub(crate) fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encodes_reserved() {
        assert_eq!(segment("orb-slam3"), "orb-slam3");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
