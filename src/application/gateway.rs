//! Market data gateway.
//!
//! The single entry point for quotes, expirations and option chains. Every
//! request follows the same path:
//!
//! ```text
//! cache hit ──► return
//!     │ miss
//!     ▼
//! in-flight for key? ──► join it
//!     │ no
//!     ▼
//! cache hit (filled meanwhile) ──► return
//!     │ miss
//!     ▼
//! primary ──ok──► cache (primary TTL) ──► return to all joined callers
//!     │ err
//!     ▼
//! fallback ──ok──► cache (fallback TTL) ──► return to all joined callers
//!     │ err
//!     ▼
//! AllProvidersFailed (nothing cached)
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::coalesce::Coalescer;
use super::policy::{Source, TtlPolicy};
use crate::domain::{CacheKey, DataKind, OptionsChain, Quote, Symbol};
use crate::error::{FetchError, ProviderError, Result};
use crate::port::{get_typed, set_typed, CacheStore, MarketDataProvider};

/// Upper bound on a single provider call unless configured otherwise.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(8);

/// Provider name used for requests rejected before reaching any vendor.
const GATEWAY: &str = "gateway";

/// Operational snapshot returned by [`MarketDataGateway::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    pub primary: &'static str,
    pub fallback: Option<&'static str>,
    pub cache_enabled: bool,
    pub cache_driver: Option<&'static str>,
    pub in_flight: InFlight,
}

/// In-flight coalesced operations per data kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub quotes: usize,
    pub expirations: usize,
    pub chains: usize,
}

impl InFlight {
    #[must_use]
    pub fn total(&self) -> usize {
        self.quotes + self.expirations + self.chains
    }
}

/// Everything a fetch needs once it has been detached from the caller.
#[derive(Clone)]
struct Upstream {
    primary: Arc<dyn MarketDataProvider>,
    fallback: Option<Arc<dyn MarketDataProvider>>,
    cache: Option<Arc<dyn CacheStore>>,
    policy: TtlPolicy,
    call_timeout: Duration,
}

impl Upstream {
    async fn invoke<T, F>(
        &self,
        provider: &Arc<dyn MarketDataProvider>,
        call: &F,
    ) -> std::result::Result<T, ProviderError>
    where
        F: Fn(Arc<dyn MarketDataProvider>) -> BoxFuture<'static, std::result::Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.call_timeout, call(Arc::clone(provider))).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: provider.name(),
                timeout_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn settle<T: Serialize>(&self, kind: DataKind, source: Source, key: &CacheKey, value: &T) {
        if let Some(cache) = &self.cache {
            let ttl = self.policy.ttl(kind, source);
            set_typed(cache.as_ref(), key, value, ttl).await;
            debug!(kind = %kind, key = %key, ttl_secs = ttl.as_secs(), ?source, "Cached");
        }
    }

    async fn fetch<T, F>(
        self,
        kind: DataKind,
        key: CacheKey,
        call: F,
    ) -> std::result::Result<T, FetchError>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fn(Arc<dyn MarketDataProvider>) -> BoxFuture<'static, std::result::Result<T, ProviderError>>
            + Send
            + Sync,
    {
        // A caller whose cache read straddled the previous fetch settling
        // lands here with the value already stored.
        if let Some(cache) = &self.cache {
            if let Some(hit) = get_typed::<T>(cache.as_ref(), &key).await {
                debug!(kind = %kind, key = %key, "Cache filled before fetch started");
                return Ok(hit);
            }
        }

        let primary_err = match self.invoke(&self.primary, &call).await {
            Ok(value) => {
                self.settle(kind, Source::Primary, &key, &value).await;
                return Ok(value);
            }
            Err(e) => e,
        };

        let Some(fallback) = self.fallback.clone() else {
            warn!(
                kind = %kind,
                key = %key,
                error = %primary_err,
                "Primary provider failed, no fallback configured"
            );
            return Err(FetchError::Provider(primary_err));
        };

        warn!(
            kind = %kind,
            key = %key,
            primary = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_err,
            "Primary provider failed, trying fallback"
        );

        match self.invoke(&fallback, &call).await {
            Ok(value) => {
                self.settle(kind, Source::Fallback, &key, &value).await;
                Ok(value)
            }
            Err(fallback_err) => {
                error!(
                    kind = %kind,
                    key = %key,
                    primary_error = %primary_err,
                    fallback_error = %fallback_err,
                    "All providers failed"
                );
                Err(FetchError::AllProvidersFailed {
                    primary: primary_err,
                    fallback: fallback_err,
                })
            }
        }
    }
}

/// Caching, coalescing, fallback-aware front for market data providers.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct MarketDataGateway {
    upstream: Upstream,
    quotes: Arc<Coalescer<Quote>>,
    expirations: Arc<Coalescer<Vec<NaiveDate>>>,
    chains: Arc<Coalescer<OptionsChain>>,
}

impl MarketDataGateway {
    /// Gateway over `primary` with no fallback, no cache and the default
    /// TTL table.
    pub fn new(primary: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            upstream: Upstream {
                primary,
                fallback: None,
                cache: None,
                policy: TtlPolicy::default(),
                call_timeout: DEFAULT_CALL_TIMEOUT,
            },
            quotes: Coalescer::new("quotes"),
            expirations: Coalescer::new("expirations"),
            chains: Coalescer::new("chains"),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn MarketDataProvider>) -> Self {
        self.upstream.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.upstream.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TtlPolicy) -> Self {
        self.upstream.policy = policy;
        self
    }

    /// Bound each provider call. A call that exceeds it counts as a failure.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.upstream.call_timeout = timeout;
        self
    }

    /// Latest quote for `symbol`.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = normalize(symbol)?;
        let key = CacheKey::quote(&symbol);
        self.resolve(DataKind::Quote, key, &self.quotes, move |provider| {
            let symbol = symbol.clone();
            async move { provider.get_quote(&symbol).await }.boxed()
        })
        .await
    }

    /// Listed expiration dates for `symbol`, ascending.
    pub async fn get_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        let symbol = normalize(symbol)?;
        let key = CacheKey::expirations(&symbol);
        self.resolve(DataKind::Expirations, key, &self.expirations, move |provider| {
            let symbol = symbol.clone();
            async move { provider.get_expirations(&symbol).await }.boxed()
        })
        .await
    }

    /// Option chain for `symbol` at `expiration`.
    pub async fn get_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<OptionsChain> {
        let symbol = normalize(symbol)?;
        let key = CacheKey::chain(&symbol, expiration);
        self.resolve(DataKind::Chain, key, &self.chains, move |provider| {
            let symbol = symbol.clone();
            async move { provider.get_chain(&symbol, expiration).await }.boxed()
        })
        .await
    }

    /// Drop every cached entry. In-flight operations are unaffected.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.upstream.cache {
            cache.clear().await;
            debug!(store = cache.name(), "Cache cleared");
        }
    }

    #[must_use]
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            primary: self.upstream.primary.name(),
            fallback: self.upstream.fallback.as_ref().map(|p| p.name()),
            cache_enabled: self.upstream.cache.is_some(),
            cache_driver: self.upstream.cache.as_ref().map(|c| c.name()),
            in_flight: InFlight {
                quotes: self.quotes.in_flight(),
                expirations: self.expirations.in_flight(),
                chains: self.chains.in_flight(),
            },
        }
    }

    async fn resolve<T, F>(
        &self,
        kind: DataKind,
        key: CacheKey,
        registry: &Arc<Coalescer<T>>,
        call: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: Fn(Arc<dyn MarketDataProvider>) -> BoxFuture<'static, std::result::Result<T, ProviderError>>
            + Send
            + Sync
            + 'static,
    {
        if let Some(cache) = &self.upstream.cache {
            if let Some(hit) = get_typed::<T>(cache.as_ref(), &key).await {
                debug!(kind = %kind, key = %key, "Cache hit");
                return Ok(hit);
            }
            debug!(kind = %kind, key = %key, "Cache miss");
        }

        let upstream = self.upstream.clone();
        let owned_key = key.clone();
        let value = registry
            .run(&key, move || upstream.fetch(kind, owned_key, call))
            .await?;
        Ok(value)
    }
}

fn normalize(raw: &str) -> std::result::Result<Symbol, ProviderError> {
    Symbol::parse(raw).ok_or_else(|| ProviderError::no_data(GATEWAY, "empty symbol"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_normalized_before_keying() {
        let symbol = normalize("  spy ").unwrap();
        assert_eq!(CacheKey::quote(&symbol), CacheKey::new("quote:SPY"));
    }

    #[test]
    fn blank_symbol_is_no_data() {
        assert!(matches!(
            normalize("   "),
            Err(ProviderError::NoData { provider: GATEWAY, .. })
        ));
    }

    #[test]
    fn in_flight_total_sums_kinds() {
        let in_flight = InFlight {
            quotes: 2,
            expirations: 1,
            chains: 3,
        };
        assert_eq!(in_flight.total(), 6);
    }
}
