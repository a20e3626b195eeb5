use std::sync::Arc;

use quotegate::adapter::outbound::cache::MemoryStore;
use quotegate::application::MarketDataGateway;
use quotegate::port::{CacheStore, MarketDataProvider};
use quotegate::testkit::provider::ScriptedProvider;

/// Primary and fallback doubles plus the in-process store behind a gateway.
pub struct Harness {
    pub primary: Arc<ScriptedProvider>,
    pub fallback: Arc<ScriptedProvider>,
    pub cache: Arc<MemoryStore>,
    pub gateway: Arc<MarketDataGateway>,
}

impl Harness {
    pub fn new(primary: ScriptedProvider, fallback: ScriptedProvider) -> Self {
        let primary = Arc::new(primary);
        let fallback = Arc::new(fallback);
        let cache = Arc::new(MemoryStore::new());
        let gateway = MarketDataGateway::new(Arc::clone(&primary) as Arc<dyn MarketDataProvider>)
            .with_fallback(Arc::clone(&fallback) as Arc<dyn MarketDataProvider>)
            .with_cache(Arc::clone(&cache) as Arc<dyn CacheStore>);
        Self {
            primary,
            fallback,
            cache,
            gateway: Arc::new(gateway),
        }
    }

    /// Rebuild the gateway with a transformation applied, keeping doubles
    /// and cache.
    pub fn map_gateway(self, f: impl FnOnce(MarketDataGateway) -> MarketDataGateway) -> Self {
        let gateway = MarketDataGateway::new(Arc::clone(&self.primary) as Arc<dyn MarketDataProvider>)
            .with_fallback(Arc::clone(&self.fallback) as Arc<dyn MarketDataProvider>)
            .with_cache(Arc::clone(&self.cache) as Arc<dyn CacheStore>);
        Self {
            gateway: Arc::new(f(gateway)),
            ..self
        }
    }
}
