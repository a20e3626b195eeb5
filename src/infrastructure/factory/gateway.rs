//! Gateway factory.

use crate::application::MarketDataGateway;
use crate::error::Result;
use crate::infrastructure::config::Config;

use super::{build_cache, build_fallback, build_primary};

/// Build a gateway wired from `config`: providers, cache tier, TTL policy
/// and call timeout.
///
/// Must be called from within a Tokio runtime (see [`build_cache`]).
///
/// # Errors
///
/// Fails fast on any configuration error, before a request is served.
pub fn build_gateway(config: &Config) -> Result<MarketDataGateway> {
    let primary = build_primary(&config.providers)?;
    let fallback = build_fallback(&config.providers)?;
    let cache = build_cache(&config.cache)?;

    let mut gateway = MarketDataGateway::new(primary)
        .with_policy(config.ttl.policy())
        .with_call_timeout(config.gateway.call_timeout());
    if let Some(fallback) = fallback {
        gateway = gateway.with_fallback(fallback);
    }
    if let Some(cache) = cache {
        gateway = gateway.with_cache(cache);
    }
    Ok(gateway)
}
