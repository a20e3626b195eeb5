//! Tracing subscriber setup.
//!
//! Diagnostics always go to stderr. Stdout carries command output only, so
//! `quotegate --json quote SPY | jq .price` keeps working with logging on.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive such as `warn` or `quotegate=debug`. `RUST_LOG`
    /// replaces it when set.
    pub level: String,
    /// `json` for one JSON object per event; anything else is human-readable.
    pub format: String,
}

impl LoggingConfig {
    fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    /// Install the global subscriber. Call once, before building the gateway.
    pub fn init(&self) {
        let builder = fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr);
        if self.is_json() {
            builder.json().init();
        } else {
            builder.init();
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_quiet_and_human_readable() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert!(!config.is_json());
    }

    #[test]
    fn json_format_ignores_case() {
        let config = LoggingConfig {
            format: "JSON".into(),
            ..LoggingConfig::default()
        };
        assert!(config.is_json());
    }
}
