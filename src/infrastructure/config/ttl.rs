//! `[ttl]` section: cache lifetimes in seconds.

use std::time::Duration;

use serde::Deserialize;

use crate::application::policy::{KindTtl, TtlPolicy};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub quote_secs: u64,
    pub quote_fallback_secs: u64,
    pub chain_secs: u64,
    pub chain_fallback_secs: u64,
    pub expirations_secs: u64,
    pub expirations_fallback_secs: u64,
}

impl TtlConfig {
    /// Every field with its dotted config path, for validation messages.
    pub(crate) fn fields(&self) -> [(&'static str, u64); 6] {
        [
            ("ttl.quote_secs", self.quote_secs),
            ("ttl.quote_fallback_secs", self.quote_fallback_secs),
            ("ttl.chain_secs", self.chain_secs),
            ("ttl.chain_fallback_secs", self.chain_fallback_secs),
            ("ttl.expirations_secs", self.expirations_secs),
            ("ttl.expirations_fallback_secs", self.expirations_fallback_secs),
        ]
    }

    #[must_use]
    pub fn policy(&self) -> TtlPolicy {
        let pair = |primary, fallback| KindTtl {
            primary: Duration::from_secs(primary),
            fallback: Duration::from_secs(fallback),
        };
        TtlPolicy {
            quote: pair(self.quote_secs, self.quote_fallback_secs),
            chain: pair(self.chain_secs, self.chain_fallback_secs),
            expirations: pair(self.expirations_secs, self.expirations_fallback_secs),
        }
    }
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            quote_secs: 30,
            quote_fallback_secs: 15,
            chain_secs: 60,
            chain_fallback_secs: 30,
            expirations_secs: 300,
            expirations_fallback_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_default_policy() {
        assert_eq!(TtlConfig::default().policy(), TtlPolicy::default());
    }
}
