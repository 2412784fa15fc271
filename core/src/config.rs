//! Client configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

pub const BASE_URL_VAR: &str = "TODO_API_BASE_URL";
pub const API_PREFIX_VAR: &str = "TODO_API_PREFIX";
pub const TIMEOUT_VAR: &str = "TODO_API_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from process environment variables, defaulting unset ones.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTimeout` if the timeout is not a positive
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(prefix) = lookup(API_PREFIX_VAR) {
            config.api_prefix = prefix;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Base URL joined with the API prefix, without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, Duration::from_millis(10_000));
        assert_eq!(config.api_root(), "http://127.0.0.1:8080/api");
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://todo.example.com/"),
            (API_PREFIX_VAR, "/v2/"),
            (TIMEOUT_VAR, "2500"),
        ]))
        .unwrap();
        assert_eq!(config.api_root(), "https://todo.example.com/v2");
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn empty_prefix_is_allowed() {
        let config = ClientConfig::new("http://localhost:3000").with_api_prefix("");
        assert_eq!(config.api_root(), "http://localhost:3000");
    }

    #[test]
    fn rejects_bad_timeout() {
        for raw in ["soon", "0", "-5"] {
            let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }), "{raw}");
        }
    }
}
