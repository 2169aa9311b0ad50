//! Typed access to persisted dashboard preferences.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::store::{HAS_SEEN_WELCOME_KEY, KeyValueStore, SIDEBAR_COLLAPSED_KEY, THEME_KEY};

// ============================================================================
// Theme
// ============================================================================

/// Dashboard colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Light scheme.
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

impl Theme {
    /// Returns the stored string form.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Returns the opposite scheme.
    #[inline]
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::storage(format!("Unknown theme: {other}"))),
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Preference accessors over a [`KeyValueStore`].
///
/// Unknown or missing values fall back to defaults.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("theme", &self.theme())
            .field("sidebar_collapsed", &self.sidebar_collapsed())
            .field("has_seen_welcome", &self.has_seen_welcome())
            .finish()
    }
}

impl Preferences {
    /// Creates accessors over `store`.
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.store
            .get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Persists `theme`.
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Whether the sidebar is collapsed.
    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        self.flag(SIDEBAR_COLLAPSED_KEY)
    }

    /// Persists the sidebar state.
    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<()> {
        self.set_flag(SIDEBAR_COLLAPSED_KEY, collapsed)
    }

    /// Whether the welcome screen was dismissed.
    #[must_use]
    pub fn has_seen_welcome(&self) -> bool {
        self.flag(HAS_SEEN_WELCOME_KEY)
    }

    /// Marks the welcome screen as dismissed.
    pub fn mark_welcome_seen(&self) -> Result<()> {
        self.set_flag(HAS_SEEN_WELCOME_KEY, true)
    }

    fn flag(&self, key: &str) -> bool {
        self.store.get(key).is_some_and(|v| v == "true")
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        self.store.set(key, if value { "true" } else { "false" })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        (store, prefs)
    }

    #[test]
    fn test_defaults() {
        let (_, prefs) = prefs();
        assert_eq!(prefs.theme(), Theme::Light);
        assert!(!prefs.sidebar_collapsed());
        assert!(!prefs.has_seen_welcome());
    }

    #[test]
    fn test_theme_roundtrip_and_toggle() {
        let (store, prefs) = prefs();
        prefs.set_theme(Theme::Dark).unwrap();
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let (store, prefs) = prefs();
        store.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_flags_stored_as_strings() {
        let (store, prefs) = prefs();
        prefs.set_sidebar_collapsed(true).unwrap();
        prefs.mark_welcome_seen().unwrap();

        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("true"));
        assert_eq!(store.get(HAS_SEEN_WELCOME_KEY).as_deref(), Some("true"));
        assert!(prefs.sidebar_collapsed());

        prefs.set_sidebar_collapsed(false).unwrap();
        assert!(!prefs.sidebar_collapsed());
    }
}
