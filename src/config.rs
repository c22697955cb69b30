//! Suite configuration
//!
//! Precedence, lowest to highest: built-in defaults, environment (`NO_COLOR`, `TESTIT_TIMEOUT`), harness flags.

use crate::timeout::Timeout;

/// Environment variable that overrides the default per-item timeout.
pub const TIMEOUT_ENV: &str = "TESTIT_TIMEOUT";

/// Suite configuration
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Name reported to the result sink
    pub name: String,
    /// Whether console output uses ANSI colors
    pub colors: bool,
    /// Timeout for items registered without one
    pub default_timeout: Timeout,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            name: "tests".to_string(),
            colors: true,
            default_timeout: Timeout::default(),
        }
    }
}

impl SuiteConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_default_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.default_timeout = timeout.into();
        self
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`.
    ///
    /// `NO_COLOR` set to anything non-empty turns colors off. An unparseable `TESTIT_TIMEOUT` is logged and
    /// ignored.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.colors = false;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.parse::<Timeout>() {
                Ok(timeout) => self.default_timeout = timeout,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring {TIMEOUT_ENV}"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    // ========================================
    // Default config tests
    // ========================================

    #[test]
    fn test_default_config() {
        let config = SuiteConfig::default();
        assert_eq!(config.name, "tests");
        assert!(config.colors);
        assert_eq!(config.default_timeout, Timeout::After(Duration::from_secs(20)));
    }

    // ========================================
    // Builder method tests
    // ========================================

    #[test]
    fn test_builder_chain() {
        let config = SuiteConfig::new()
            .with_name("integration")
            .with_colors(false)
            .with_default_timeout(Duration::from_secs(5));
        assert_eq!(config.name, "integration");
        assert!(!config.colors);
        assert_eq!(config.default_timeout, Timeout::After(Duration::from_secs(5)));
    }

    #[test]
    fn test_builder_override() {
        let config = SuiteConfig::new()
            .with_default_timeout(Duration::from_secs(5))
            .with_default_timeout(Timeout::Disabled);
        assert_eq!(config.default_timeout, Timeout::Disabled); // Last value wins
    }

    // ========================================
    // Environment tests
    // ========================================

    #[test]
    fn test_no_color_disables_colors() {
        let config = SuiteConfig::new().apply_vars(vars(&[("NO_COLOR", "1")]));
        assert!(!config.colors);
    }

    #[test]
    fn test_empty_no_color_is_ignored() {
        let config = SuiteConfig::new().apply_vars(vars(&[("NO_COLOR", "")]));
        assert!(config.colors);
    }

    #[test]
    fn test_timeout_env() {
        let config = SuiteConfig::new().apply_vars(vars(&[(TIMEOUT_ENV, "2 minutes")]));
        assert_eq!(config.default_timeout, Timeout::After(Duration::from_secs(120)));

        let config = SuiteConfig::new().apply_vars(vars(&[(TIMEOUT_ENV, "Infinity")]));
        assert_eq!(config.default_timeout, Timeout::Disabled);
    }

    #[test]
    fn test_invalid_timeout_env_keeps_default() {
        let config = SuiteConfig::new().apply_vars(vars(&[(TIMEOUT_ENV, "eventually")]));
        assert_eq!(config.default_timeout, Timeout::default());
    }
}
