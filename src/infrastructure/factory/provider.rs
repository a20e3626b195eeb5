//! Market data provider factory.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::provider::{Polygon, Yahoo};
use crate::error::Result;
use crate::infrastructure::config::ProvidersConfig;
use crate::port::MarketDataProvider;

/// Build the primary vendor adapter.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`](crate::error::ConfigError::MissingField)
/// when `POLYGON_API_KEY` is not set, or an invalid-value error for unusable
/// settings.
pub fn build_primary(config: &ProvidersConfig) -> Result<Arc<dyn MarketDataProvider>> {
    let provider = Polygon::new(&config.primary)?;
    info!(provider = "polygon", "Primary provider initialized");
    Ok(Arc::new(provider))
}

/// Build the fallback vendor adapter, or `None` when it is disabled.
///
/// # Errors
///
/// Returns an invalid-value error for unusable settings.
pub fn build_fallback(config: &ProvidersConfig) -> Result<Option<Arc<dyn MarketDataProvider>>> {
    if !config.fallback.enabled {
        info!("Fallback provider disabled");
        return Ok(None);
    }
    let provider = Yahoo::new(&config.fallback)?;
    info!(provider = "yahoo", "Fallback provider initialized");
    Ok(Some(Arc::new(provider)))
}
