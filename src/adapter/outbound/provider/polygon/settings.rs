//! Polygon adapter settings.

use std::time::Duration;

use serde::Deserialize;

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

/// Settings for the paid primary vendor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolygonSettings {
    pub base_url: String,
    /// Loaded from `POLYGON_API_KEY`; never read from the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    /// Upper bound on pages fetched per listing call.
    pub max_pages: usize,
    /// Page size requested from listing endpoints.
    pub page_limit: u32,
}

impl PolygonSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PolygonSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            timeout_ms: 5_000,
            max_pages: 10,
            page_limit: 250,
        }
    }
}
