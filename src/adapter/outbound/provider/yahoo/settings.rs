//! Yahoo Finance adapter settings.

use std::time::Duration;

use serde::Deserialize;

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo rejects requests without a browser-like user agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Settings for the free fallback vendor. No credential is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YahooSettings {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl YahooSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.into(),
            timeout_ms: 5_000,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}
