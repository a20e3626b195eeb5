//! Memoization of arbitrary computations over a (usually tiered) cache.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::coalesce::Coalescer;
use crate::domain::CacheKey;
use crate::error::FetchError;
use crate::port::{get_typed, set_typed, CacheStore};

/// Caches computation results by key and runs each missing computation
/// at most once per process at a time.
///
/// Keys should come from [`CacheKey::hashed`] so that logically identical
/// inputs always land on the same entry.
pub struct Memoizer {
    store: Arc<dyn CacheStore>,
    inflight: Arc<Coalescer<Value>>,
}

impl Memoizer {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            inflight: Coalescer::new("memo"),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        get_typed(self.store.as_ref(), key).await
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        set_typed(self.store.as_ref(), key, value, ttl).await;
    }

    /// Return the cached value for `key`, or run `compute`, cache its result
    /// for `ttl` and return it.
    ///
    /// Concurrent callers for the same key share one run of `compute`.
    /// Failed computations are not cached.
    ///
    /// # Errors
    ///
    /// [`FetchError::Compute`] when `compute` fails or its result does not
    /// serialize; [`FetchError::Aborted`] when it panics.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<T, FetchError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: Display + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(hit) = self.get::<T>(key).await {
            debug!(key = %key, "Memo hit");
            return Ok(hit);
        }

        let store = Arc::clone(&self.store);
        let owned_key = key.clone();
        let value = self
            .inflight
            .run(key, move || {
                let pending = compute();
                async move {
                    if let Some(filled) = store.get(&owned_key).await {
                        return Ok(filled);
                    }
                    let encoded = match pending.await {
                        Ok(computed) => serde_json::to_value(&computed)
                            .map_err(|e| FetchError::Compute(e.to_string()))?,
                        Err(e) => return Err(FetchError::Compute(e.to_string())),
                    };
                    store.set(&owned_key, encoded.clone(), ttl).await;
                    Ok(encoded)
                }
            })
            .await?;

        serde_json::from_value(value).map_err(|e| FetchError::Compute(e.to_string()))
    }
}
