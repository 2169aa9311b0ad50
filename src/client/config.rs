//! Endpoint configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPENSLAM_API_URL` | `http://localhost:8000/api` |
//! | `OPENSLAM_WS_URL` | `ws://localhost:8000/ws` |
//! | `OPENSLAM_RECONNECT_ATTEMPTS` | `5` |
//! | `OPENSLAM_RECONNECT_DELAY_MS` | `1000` |

// ============================================================================
// Imports
// ============================================================================

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::realtime::ReconnectPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Default REST base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default realtime socket URL.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Environment variable overriding the REST base URL.
pub const API_URL_VAR: &str = "OPENSLAM_API_URL";

/// Environment variable overriding the socket URL.
pub const WS_URL_VAR: &str = "OPENSLAM_WS_URL";

/// Environment variable overriding the reconnect budget.
pub const RECONNECT_ATTEMPTS_VAR: &str = "OPENSLAM_RECONNECT_ATTEMPTS";

/// Environment variable overriding the base reconnect delay, in milliseconds.
pub const RECONNECT_DELAY_VAR: &str = "OPENSLAM_RECONNECT_DELAY_MS";

// ============================================================================
// ClientConfig
// ============================================================================

/// Backend endpoints and reconnect policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST base URL.
    pub api_url: String,
    /// Realtime socket URL.
    pub ws_url: String,
    /// Realtime reconnect policy.
    pub reconnect_policy: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            reconnect_policy: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset or empty variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let max_attempts = match lookup(RECONNECT_ATTEMPTS_VAR) {
            Some(raw) => parse_var(RECONNECT_ATTEMPTS_VAR, &raw)?,
            None => defaults.reconnect_policy.max_attempts,
        };
        let base_delay = match lookup(RECONNECT_DELAY_VAR) {
            Some(raw) => Duration::from_millis(parse_var(RECONNECT_DELAY_VAR, &raw)?),
            None => defaults.reconnect_policy.base_delay,
        };

        let config = Self {
            api_url: lookup(API_URL_VAR).unwrap_or(defaults.api_url),
            ws_url: lookup(WS_URL_VAR).unwrap_or(defaults.ws_url),
            reconnect_policy: ReconnectPolicy::new(max_attempts, base_delay),
        };

        debug!(api_url = %config.api_url, ws_url = %config.ws_url, "Loaded client config");
        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::config(format!("{name}={raw:?} is invalid: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use rustc_hash::FxHashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.ws_url, "ws://localhost:8000/ws");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(env(&[
            (API_URL_VAR, "https://slam.example.org/api"),
            (WS_URL_VAR, "wss://slam.example.org/ws"),
            (RECONNECT_ATTEMPTS_VAR, "3"),
            (RECONNECT_DELAY_VAR, " 250 "),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://slam.example.org/api");
        assert_eq!(config.ws_url, "wss://slam.example.org/ws");
        assert_eq!(
            config.reconnect_policy,
            ReconnectPolicy::new(3, Duration::from_millis(250))
        );
    }

    #[test]
    fn test_empty_value_falls_back() {
        let config = ClientConfig::from_lookup(env(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let err = ClientConfig::from_lookup(env(&[(RECONNECT_ATTEMPTS_VAR, "many")])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains(RECONNECT_ATTEMPTS_VAR));
    }
}
