//! Key/value cache port with per-entry time-to-live.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::CacheKey;

/// Key/value store with per-entry TTL.
///
/// Expiry is checked on read: an entry is never returned at or past its
/// expiry instant. Implementations are infallible from the caller's point of
/// view; a store that cannot reach its backend reports a miss on read and
/// drops writes, logging the failure.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; gateways share one store across
/// all concurrent requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store name for logging and stats.
    fn name(&self) -> &'static str;

    /// Get a live value together with its remaining time-to-live.
    async fn get_with_ttl(&self, key: &CacheKey) -> Option<(Value, Duration)>;

    /// Get a live value.
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        self.get_with_ttl(key).await.map(|(value, _)| value)
    }

    /// Store `value` until now + `ttl`, replacing any existing entry.
    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration);

    /// Remove one entry.
    async fn delete(&self, key: &CacheKey);

    /// Remove every entry owned by this store.
    async fn clear(&self);
}

/// Read and decode a typed value. Entries that no longer decode (schema
/// drift in a shared tier) are treated as misses.
pub async fn get_typed<T: DeserializeOwned>(store: &dyn CacheStore, key: &CacheKey) -> Option<T> {
    let value = store.get(key).await?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(store = store.name(), key = %key, error = %e, "Discarding undecodable cache entry");
            None
        }
    }
}

/// Encode and store a typed value. Encoding failures are logged and dropped.
pub async fn set_typed<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &CacheKey,
    value: &T,
    ttl: Duration,
) {
    match serde_json::to_value(value) {
        Ok(encoded) => store.set(key, encoded, ttl).await,
        Err(e) => warn!(store = store.name(), key = %key, error = %e, "Failed to encode cache entry"),
    }
}
