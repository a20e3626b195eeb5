//! Application configuration loading and validation.
//!
//! Provides the [`Config`] struct that aggregates all settings. Configuration
//! is loaded from a TOML file; credentials come from the environment only
//! (`POLYGON_API_KEY`, `REMOTE_CACHE_TOKEN`, optionally `REMOTE_CACHE_URL`).
//!
//! # Example
//!
//! ```no_run
//! use quotegate::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("config.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::cache::{CacheConfig, REMOTE_TOKEN_ENV, REMOTE_URL_ENV};
use super::logging::LoggingConfig;
use super::providers::ProvidersConfig;
use super::ttl::TtlConfig;
use crate::adapter::outbound::provider::polygon::API_KEY_ENV;
use crate::application::gateway::DEFAULT_CALL_TIMEOUT;
use crate::error::{ConfigError, Result};

/// `[gateway]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upper bound on any single provider call.
    pub call_timeout_ms: u64,
}

impl GatewayConfig {
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: u64::try_from(DEFAULT_CALL_TIMEOUT.as_millis()).unwrap_or(8_000),
        }
    }
}

/// Top-level configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub ttl: TtlConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Config {
    /// Parse configuration from TOML content, then apply environment
    /// credentials and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_with(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] when the file exists.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Fill credentials from an environment lookup. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v: &String| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.providers.primary.api_key = Some(key);
        }
        if let Some(token) = get(REMOTE_TOKEN_ENV) {
            self.cache.remote.token = Some(token);
        }
        if let Some(url) = get(REMOTE_URL_ENV) {
            self.cache.remote.url = url;
        }
    }

    /// Validate configuration values.
    ///
    /// Credentials are not checked here; providers reject missing ones when
    /// they are constructed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero TTLs, timeouts, page
    /// caps or sweep intervals.
    pub fn validate(&self) -> Result<()> {
        for (field, secs) in self.ttl.fields() {
            if secs == 0 {
                return Err(positive(field));
            }
        }

        let nonzero = [
            ("providers.primary.timeout_ms", self.providers.primary.timeout_ms),
            ("providers.fallback.timeout_ms", self.providers.fallback.timeout_ms),
            ("cache.remote.timeout_ms", self.cache.remote.timeout_ms),
            ("cache.sweep_interval_secs", self.cache.sweep_interval_secs),
            ("gateway.call_timeout_ms", self.gateway.call_timeout_ms),
        ];
        for (field, value) in nonzero {
            if value == 0 {
                return Err(positive(field));
            }
        }

        if self.providers.primary.max_pages == 0 {
            return Err(positive("providers.primary.max_pages"));
        }

        Ok(())
    }
}

fn positive(field: &'static str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: "must be greater than 0".to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("");
        config.validate().unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.driver, "memory");
        assert_eq!(config.ttl.quote_secs, 30);
        assert_eq!(config.providers.primary.max_pages, 10);
        assert!(config.providers.fallback.enabled);
        assert_eq!(config.gateway.call_timeout_ms, 8_000);
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse(
            r#"
            [cache]
            driver = "tiered"
            sweep_interval_secs = 5

            [cache.remote]
            url = "https://kv.example.com"

            [ttl]
            quote_secs = 10

            [providers.primary]
            max_pages = 3

            [providers.fallback]
            enabled = false
            "#,
        );
        assert_eq!(config.cache.sweep_interval_secs, 5);
        assert_eq!(config.cache.remote.url, "https://kv.example.com");
        assert_eq!(config.ttl.quote_secs, 10);
        assert_eq!(config.ttl.chain_secs, 60);
        assert_eq!(config.providers.primary.max_pages, 3);
        assert!(!config.providers.fallback.enabled);
    }

    #[test]
    fn api_key_in_file_is_ignored() {
        let config = parse(
            r#"
            [providers.primary]
            api_key = "from-file"
            "#,
        );
        assert_eq!(config.providers.primary.api_key, None);
    }

    #[test]
    fn env_supplies_credentials() {
        let env: HashMap<&str, &str> = [
            ("POLYGON_API_KEY", "pk"),
            ("REMOTE_CACHE_TOKEN", "tok"),
            ("REMOTE_CACHE_URL", "https://kv.internal"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_with(|name| env.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.providers.primary.api_key.as_deref(), Some("pk"));
        assert_eq!(config.cache.remote.token.as_deref(), Some("tok"));
        assert_eq!(config.cache.remote.url, "https://kv.internal");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env_with(|_| Some("  ".into()));
        assert_eq!(config.providers.primary.api_key, None);
        assert!(config.cache.remote.url.is_empty());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = parse("[ttl]\nchain_fallback_secs = 0\n");
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "ttl.chain_fallback_secs",
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = parse("[gateway]\ncall_timeout_ms = 0\n");
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "gateway.call_timeout_ms",
                ..
            }))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[cache\nenabled = true").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }
}
