//! Freshness policy per data kind and source.

use std::time::Duration;

use serde::Serialize;

use crate::domain::DataKind;

/// Which provider produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Primary,
    Fallback,
}

/// TTL for one data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindTtl {
    pub primary: Duration,
    pub fallback: Duration,
}

/// Cache lifetime for every (data kind, source) pair.
///
/// Fallback data is kept for a shorter time than primary data so the
/// primary vendor is retried sooner once it recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub quote: KindTtl,
    pub chain: KindTtl,
    pub expirations: KindTtl,
}

impl TtlPolicy {
    #[must_use]
    pub fn ttl(&self, kind: DataKind, source: Source) -> Duration {
        let entry = match kind {
            DataKind::Quote => self.quote,
            DataKind::Chain => self.chain,
            DataKind::Expirations => self.expirations,
        };
        match source {
            Source::Primary => entry.primary,
            Source::Fallback => entry.fallback,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        let secs = Duration::from_secs;
        Self {
            quote: KindTtl {
                primary: secs(30),
                fallback: secs(15),
            },
            chain: KindTtl {
                primary: secs(60),
                fallback: secs(30),
            },
            expirations: KindTtl {
                primary: secs(300),
                fallback: secs(120),
            },
        }
    }
}
