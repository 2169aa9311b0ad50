//! Realtime frame format.
//!
//! Every frame in both directions is a JSON object:
//!
//! ```json
//! { "type": "evaluation_complete", "payload": { "name": "run1" } }
//! ```
//!
//! The client does not restrict `type`: listeners subscribe by name.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Frame
// ============================================================================

/// One realtime message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name listeners subscribe to.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event data. Missing payloads decode as `null`.
    #[serde(default)]
    pub payload: Value,
}

impl Frame {
    /// Creates a frame.
    #[inline]
    #[must_use]
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Parses an inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `text` is not a frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes for the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) on serialization failure.
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_parse_frame() {
        let frame =
            Frame::parse(r#"{"type":"evaluation_complete","payload":{"name":"run1"}}"#).unwrap();
        assert_eq!(frame.event_type, "evaluation_complete");
        assert_eq!(frame.payload, json!({ "name": "run1" }));
    }

    #[test]
    fn test_missing_payload_is_null() {
        let frame = Frame::parse(r#"{"type":"config_update"}"#).unwrap();
        assert_eq!(frame.payload, Value::Null);
    }

    #[test]
    fn test_malformed_frames_rejected() {
        assert!(Frame::parse("not json").is_err());
        assert!(Frame::parse(r#"{"payload":1}"#).is_err());
        assert!(Frame::parse(r#"{"type":7}"#).is_err());
    }

    #[test]
    fn test_to_text_shape() {
        let text = Frame::new("subscribe", json!({ "evaluation": "e1" }))
            .to_text()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({ "type": "subscribe", "payload": { "evaluation": "e1" } }));
    }
}
