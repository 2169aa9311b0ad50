//! Request descriptor types.
//!
//! A request is built fresh for every call: the client merges the caller's
//! [`RequestConfig`] over its defaults, wraps it with the target URL into an
//! [`OutgoingRequest`], and hands that to the request interceptors.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Headers
// ============================================================================

/// Multi-valued header map with case-insensitive names.
///
/// Backed by [`HeaderMap`], so repeated headers such as `Set-Cookie` keep
/// every value. String-based setters validate names and values up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HeaderMap,
}

impl Headers {
    /// Creates an empty header map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing every existing value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the name or value is not valid on
    /// the wire.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_pair(name, value)?;
        self.map.insert(name, value);
        Ok(())
    }

    /// Adds `value` under `name`, keeping existing values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the name or value is not valid on
    /// the wire.
    pub fn append(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_pair(name, value)?;
        self.map.append(name, value);
        Ok(())
    }

    /// Typed form of [`set`](Self::set).
    #[inline]
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        self.map.insert(name, value);
    }

    /// Builder form of [`insert`](Self::insert).
    #[inline]
    #[must_use]
    pub fn with(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the first value of `name`. Non-UTF-8 values read as `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns every UTF-8 value of `name` in wire order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.map
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Returns `true` if `name` is present.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Removes every value of `name` and returns the first.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map
            .remove(name)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Overlays `other` onto `self`. Each name present in `other` replaces
    /// all of its values in `self`.
    pub fn merge(&mut self, other: &Headers) {
        for name in other.map.keys() {
            self.map.remove(name);
            for value in other.map.get_all(name) {
                self.map.append(name.clone(), value.clone());
            }
        }
    }

    /// Number of values, counting each repeat.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates `(name, value)` pairs. Non-UTF-8 values are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map
            .iter()
            .filter_map(|(n, v)| v.to_str().ok().map(|v| (n.as_str(), v)))
    }

    /// Borrows the wire header map.
    #[inline]
    #[must_use]
    pub fn as_header_map(&self) -> &HeaderMap {
        &self.map
    }

    /// Returns the wire header map.
    #[inline]
    #[must_use]
    pub fn into_header_map(self) -> HeaderMap {
        self.map
    }
}

impl From<HeaderMap> for Headers {
    #[inline]
    fn from(map: HeaderMap) -> Self {
        Self { map }
    }
}

fn parse_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::invalid_header(name, e.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e.to_string()))?;
    Ok((header_name, header_value))
}

// ============================================================================
// RequestBody
// ============================================================================

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document, serialized on send.
    Json(Value),
    /// Raw text, sent as-is.
    Text(String),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Returns the wire bytes.
    pub(crate) fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Json(value) => Ok(serde_json::to_vec(&value)?),
            Self::Text(text) => Ok(text.into_bytes()),
        }
    }
}

// ============================================================================
// RequestConfig
// ============================================================================

/// Per-call options: method, headers and body.
///
/// `method` is `None` until merged with the client defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// HTTP method. Defaults to `GET` when unset.
    pub method: Option<Method>,
    /// Caller headers, shallow-merged over the client's defaults.
    pub headers: Headers,
    /// Optional payload.
    pub body: Option<RequestBody>,
}

impl RequestConfig {
    /// Creates an empty config.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method.
    #[inline]
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets a header, replacing earlier values of the same name.
    #[inline]
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    #[inline]
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the effective method.
    #[inline]
    #[must_use]
    pub fn effective_method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// Merges `self` (caller options) over `defaults`.
    ///
    /// The caller's method and body win. Headers are overlaid name by name.
    #[must_use]
    pub fn merged_over(self, defaults: &Headers) -> Self {
        let mut headers = defaults.clone();
        headers.merge(&self.headers);

        Self {
            method: Some(self.method.unwrap_or(Method::GET)),
            headers,
            body: self.body,
        }
    }
}

// ============================================================================
// OutgoingRequest
// ============================================================================

/// Fully resolved request as seen by interceptors.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    /// Absolute target URL.
    pub url: String,
    /// Method, headers and body.
    pub config: RequestConfig,
}

impl OutgoingRequest {
    /// Creates a request descriptor.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, config: RequestConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Ordered query-string parameters.
///
/// `null` values are omitted when rendered. Strings are emitted raw and
/// every other value is rendered as its JSON text. Keys and values are
/// percent-encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, Value)>,
}

impl Query {
    /// Creates an empty query.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    #[inline]
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends a parameter only when `value` is `Some`.
    #[inline]
    #[must_use]
    pub fn param_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Builds a query from a JSON object. Non-object values yield an empty query.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                params: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            },
            _ => Self::new(),
        }
    }

    /// Returns `true` if no parameter would be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.iter().all(|(_, v)| v.is_null())
    }

    /// Renders `k=v&k=v` without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!(
                    "{}={}",
                    urlencoding::encode(k),
                    urlencoding::encode(&rendered)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the rendered query to `endpoint`, if non-empty.
    #[must_use]
    pub fn apply_to(&self, endpoint: &str) -> String {
        let qs = self.to_query_string();
        if qs.is_empty() {
            endpoint.to_string()
        } else {
            format!("{endpoint}?{qs}")
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Authorization", "Bearer a").unwrap();
        headers.set("authorization", "Bearer b").unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer b"));
        assert_eq!(headers.iter().next(), Some(("authorization", "Bearer b")));
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.set("X-Trace", "1").unwrap();
        assert_eq!(headers.remove("x-trace").as_deref(), Some("1"));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("x-trace"), None);
    }

    #[test]
    fn test_headers_invalid_value() {
        let mut headers = Headers::new();
        assert!(matches!(
            headers.set("X-Bad", "line\nbreak"),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(matches!(
            headers.append("bad name", "v"),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_keep_repeated_values() {
        let mut wire = HeaderMap::new();
        wire.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        wire.append(SET_COOKIE, HeaderValue::from_static("b=2"));

        let headers = Headers::from(wire);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("set-cookie"), Some("a=1"));
        assert_eq!(headers.get_all("Set-Cookie"), vec!["a=1", "b=2"]);
        assert_eq!(headers.into_header_map().get_all(SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_headers_append_then_set_collapses() {
        let mut headers = Headers::new();
        headers.append("Vary", "Accept").unwrap();
        headers.append("vary", "Origin").unwrap();
        assert_eq!(headers.get_all("vary"), vec!["Accept", "Origin"]);

        headers.set("VARY", "*").unwrap();
        assert_eq!(headers.get_all("vary"), vec!["*"]);
    }

    #[test]
    fn test_headers_merge_replaces_per_name() {
        let mut base = Headers::new();
        base.append("Link", "<a>").unwrap();
        base.append("Link", "<b>").unwrap();
        base.set("X-Client", "openslam").unwrap();

        let mut overlay = Headers::new();
        overlay.append("link", "<c>").unwrap();
        overlay.append("link", "<d>").unwrap();

        base.merge(&overlay);

        assert_eq!(base.get_all("link"), vec!["<c>", "<d>"]);
        assert_eq!(base.get("x-client"), Some("openslam"));
    }

    #[test]
    fn test_config_merge_shallow_headers() {
        let defaults = Headers::new()
            .with(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with(
                HeaderName::from_static("x-client"),
                HeaderValue::from_static("openslam"),
            );
        let caller = RequestConfig::new()
            .method(Method::POST)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(RequestBody::Text("hi".into()));

        let merged = caller.merged_over(&defaults);

        assert_eq!(merged.method, Some(Method::POST));
        assert_eq!(merged.headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(merged.headers.get("X-Client"), Some("openslam"));
        assert!(!merged.headers.contains(AUTHORIZATION.as_str()));
        assert_eq!(merged.body, Some(RequestBody::Text("hi".into())));
    }

    #[test]
    fn test_config_merge_defaults_to_get() {
        let merged = RequestConfig::new().merged_over(&Headers::new());
        assert_eq!(merged.method, Some(Method::GET));
    }

    #[test]
    fn test_query_skips_null_and_stringifies() {
        let query = Query::new()
            .param("limit", 5)
            .param("status", Value::Null)
            .param("name", "run 1")
            .param("active", true);

        assert_eq!(query.to_query_string(), "limit=5&name=run%201&active=true");
    }

    #[test]
    fn test_query_apply_to() {
        assert_eq!(
            Query::new().param("limit", 5).apply_to("/datasets"),
            "/datasets?limit=5"
        );
        assert_eq!(Query::new().apply_to("/datasets"), "/datasets");
        assert_eq!(
            Query::new().param("x", Value::Null).apply_to("/datasets"),
            "/datasets"
        );
    }

    #[test]
    fn test_query_from_json() {
        let query = Query::from_json(&json!({ "limit": 5, "offset": null }));
        assert_eq!(query.to_query_string(), "limit=5");
        assert!(Query::from_json(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_query_param_opt() {
        let query = Query::new()
            .param_opt("plugin", Some("orb-slam3"))
            .param_opt("dataset", None::<&str>);
        assert_eq!(query.to_string(), "plugin=orb-slam3");
    }

    #[test]
    fn test_body_bytes() {
        let body = RequestBody::json(&json!({ "a": 1 })).unwrap();
        assert_eq!(body.into_bytes().unwrap(), br#"{"a":1}"#.to_vec());
    }

    proptest! {
        #[test]
        fn prop_query_omits_exactly_nulls(values in proptest::collection::vec(proptest::option::of(0i64..1000), 0..8)) {
            let query: Query = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("k{i}"), v.map(Value::from).unwrap_or(Value::Null)))
                .collect();

            let rendered = query.to_query_string();
            let expected: Vec<String> = values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|n| format!("k{i}={n}")))
                .collect();

            prop_assert_eq!(rendered, expected.join("&"));
        }
    }
}
