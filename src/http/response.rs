//! Response envelope and body decoding.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::Result;

use super::request::Headers;

// ============================================================================
// Constants
// ============================================================================

const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// ResponseEnvelope
// ============================================================================

/// Decoded response as seen by response interceptors.
///
/// `data` holds parsed JSON when the server declared `application/json`,
/// otherwise the body text as [`Value::String`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// `true` when `status` is in 200..=299.
    pub ok: bool,
    /// HTTP status code.
    pub status: u16,
    /// Decoded body.
    pub data: Value,
    /// Raw response headers.
    pub headers: Headers,
}

impl ResponseEnvelope {
    /// Builds an envelope, deriving `ok` from `status`.
    #[must_use]
    pub fn new(status: u16, data: Value, headers: Headers) -> Self {
        Self {
            ok: is_success(status),
            status,
            data,
            headers,
        }
    }

    /// Declared content type, if any.
    #[inline]
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Returns `true` for statuses in 200..=299.
#[inline]
#[must_use]
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Returns `true` if `content_type` declares a JSON body.
#[inline]
#[must_use]
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
}

/// Decodes `body` according to `content_type`.
///
/// JSON bodies that are empty decode to [`Value::Null`].
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) when the server declared
/// JSON but sent something else.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<Value> {
    if is_json_content_type(content_type) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(body)?)
    } else {
        Ok(Value::String(String::from_utf8_lossy(body).into_owned()))
    }
}

/// Decodes an upload response: JSON if it parses, raw text otherwise.
#[must_use]
pub fn decode_lenient(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_is_success_bounds() {
        assert!(!is_success(199));
        assert!(is_success(200));
        assert!(is_success(299));
        assert!(!is_success(300));
        assert!(!is_success(404));
    }

    #[test]
    fn test_decode_json() {
        let value = decode_body(Some("application/json; charset=utf-8"), br#"{"a":[1,2]}"#).unwrap();
        assert_eq!(value, json!({ "a": [1, 2] }));
    }

    #[test]
    fn test_decode_json_primitive() {
        assert_eq!(decode_body(Some("application/json"), b"42").unwrap(), json!(42));
    }

    #[test]
    fn test_decode_empty_json_is_null() {
        assert_eq!(decode_body(Some("application/json"), b"").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_text() {
        let value = decode_body(Some("text/csv"), b"a,b\n1,2").unwrap();
        assert_eq!(value, Value::String("a,b\n1,2".into()));

        let value = decode_body(None, br#"{"looks":"json"}"#).unwrap();
        assert_eq!(value, Value::String(r#"{"looks":"json"}"#.into()));
    }

    #[test]
    fn test_decode_bad_json_errors() {
        assert!(decode_body(Some("application/json"), b"<html>").is_err());
    }

    #[test]
    fn test_decode_lenient() {
        assert_eq!(decode_lenient(br#"{"id":"ds-1"}"#), json!({ "id": "ds-1" }));
        assert_eq!(decode_lenient(b"stored"), Value::String("stored".into()));
    }

    #[test]
    fn test_envelope_ok_and_content_type() {
        let env = ResponseEnvelope::new(
            201,
            Value::Null,
            Headers::new().with(
                reqwest::header::CONTENT_TYPE,
                reqwest::header::HeaderValue::from_static("application/json"),
            ),
        );
        assert!(env.ok);
        assert_eq!(env.content_type(), Some("application/json"));
        assert!(!ResponseEnvelope::new(500, Value::Null, Headers::new()).ok);
    }
}
