//! Cache tier configuration.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::adapter::outbound::cache::RemoteStoreSettings;

/// Environment variable holding the remote tier's bearer token.
pub const REMOTE_TOKEN_ENV: &str = "REMOTE_CACHE_TOKEN";

/// Environment variable that overrides `cache.remote.url`.
pub const REMOTE_URL_ENV: &str = "REMOTE_CACHE_URL";

/// Which cache tiers back the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDriver {
    /// In-process only.
    Memory,
    /// In-process tier in front of the remote tier.
    Tiered,
}

impl CacheDriver {
    /// Interpret a configured driver name. Unrecognized names fall back to
    /// [`CacheDriver::Memory`] with a warning.
    #[must_use]
    pub fn resolve(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Self::Memory,
            "remote" | "memory+remote" | "tiered" => Self::Tiered,
            other => {
                warn!(driver = other, "Unknown cache driver, using in-process cache only");
                Self::Memory
            }
        }
    }
}

/// Remote tier connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteCacheConfig {
    pub url: String,
    /// Loaded from `REMOTE_CACHE_TOKEN`; never read from the config file.
    #[serde(skip)]
    pub token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for RemoteCacheConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            timeout_ms: 1_500,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub driver: String,
    pub sweep_interval_secs: u64,
    /// Prefix applied to every key in the remote tier.
    pub key_prefix: String,
    pub remote: RemoteCacheConfig,
}

impl CacheConfig {
    #[must_use]
    pub fn driver(&self) -> CacheDriver {
        CacheDriver::resolve(&self.driver)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    #[must_use]
    pub fn remote_settings(&self) -> RemoteStoreSettings {
        RemoteStoreSettings {
            url: self.remote.url.clone(),
            token: self.remote.token.clone(),
            key_prefix: self.key_prefix.clone(),
            timeout: Duration::from_millis(self.remote.timeout_ms),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            driver: "memory".into(),
            sweep_interval_secs: 60,
            key_prefix: "quotegate:".into(),
            remote: RemoteCacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_aliases() {
        assert_eq!(CacheDriver::resolve("memory"), CacheDriver::Memory);
        assert_eq!(CacheDriver::resolve("Remote"), CacheDriver::Tiered);
        assert_eq!(CacheDriver::resolve("memory+remote"), CacheDriver::Tiered);
        assert_eq!(CacheDriver::resolve(" tiered "), CacheDriver::Tiered);
    }

    #[test]
    fn unknown_driver_falls_back_to_memory() {
        assert_eq!(CacheDriver::resolve("memcached"), CacheDriver::Memory);
        assert_eq!(CacheDriver::resolve(""), CacheDriver::Memory);
    }
}
