//! Cache store factory.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::cache::{MemoryStore, RemoteStore, TieredStore};
use crate::error::Result;
use crate::infrastructure::config::{CacheConfig, CacheDriver};
use crate::port::CacheStore;

/// Build the cache store selected by `config`, or `None` when caching is
/// disabled.
///
/// The in-process tier's sweeper is started on the current Tokio runtime,
/// so this must be called from within one.
///
/// # Errors
///
/// Returns a configuration error when the tiered driver is selected without
/// a usable remote URL.
pub fn build_cache(config: &CacheConfig) -> Result<Option<Arc<dyn CacheStore>>> {
    if !config.enabled {
        info!("Cache disabled");
        return Ok(None);
    }

    let local = Arc::new(MemoryStore::new());
    local.start_sweeper(config.sweep_interval());

    let store: Arc<dyn CacheStore> = match config.driver() {
        CacheDriver::Memory => local,
        CacheDriver::Tiered => {
            let remote = RemoteStore::new(config.remote_settings())?;
            Arc::new(TieredStore::new(local, Arc::new(remote)))
        }
    };

    info!(driver = store.name(), "Cache initialized");
    Ok(Some(store))
}
