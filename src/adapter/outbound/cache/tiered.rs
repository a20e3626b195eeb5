//! Two-tier cache: a fast local tier in front of a shared tier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use super::MemoryStore;
use crate::domain::CacheKey;
use crate::port::CacheStore;

/// Local tier backed by a shared tier.
///
/// Reads try tier 1 first. A tier-2 hit warms tier 1 with the entry's
/// *remaining* TTL so that every process expires the value at the same
/// instant. Writes go to both tiers; the shared tier swallows its own
/// failures, so a write always lands at least locally.
pub struct TieredStore {
    local: Arc<MemoryStore>,
    shared: Arc<dyn CacheStore>,
}

impl TieredStore {
    #[must_use]
    pub fn new(local: Arc<MemoryStore>, shared: Arc<dyn CacheStore>) -> Self {
        Self { local, shared }
    }

    /// The local tier.
    #[must_use]
    pub fn local(&self) -> &Arc<MemoryStore> {
        &self.local
    }

    /// The shared tier.
    #[must_use]
    pub fn shared(&self) -> &Arc<dyn CacheStore> {
        &self.shared
    }
}

#[async_trait]
impl CacheStore for TieredStore {
    fn name(&self) -> &'static str {
        "tiered"
    }

    async fn get_with_ttl(&self, key: &CacheKey) -> Option<(Value, Duration)> {
        if let Some(hit) = self.local.get_with_ttl(key).await {
            return Some(hit);
        }

        let (value, remaining) = self.shared.get_with_ttl(key).await?;
        trace!(key = %key, remaining_ms = remaining.as_millis() as u64, "Warming local tier from shared tier");
        self.local.set(key, value.clone(), remaining).await;
        Some((value, remaining))
    }

    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) {
        self.local.set(key, value.clone(), ttl).await;
        self.shared.set(key, value, ttl).await;
    }

    async fn delete(&self, key: &CacheKey) {
        self.local.delete(key).await;
        self.shared.delete(key).await;
    }

    async fn clear(&self) {
        self.local.clear().await;
        self.shared.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::cache::FailingStore;
    use serde_json::json;

    fn tiers() -> (Arc<MemoryStore>, Arc<MemoryStore>, TieredStore) {
        let local = Arc::new(MemoryStore::new());
        let shared = Arc::new(MemoryStore::new());
        let tiered = TieredStore::new(Arc::clone(&local), shared.clone() as Arc<dyn CacheStore>);
        (local, shared, tiered)
    }

    #[tokio::test(start_paused = true)]
    async fn shared_hit_warms_local_with_remaining_ttl() {
        let (local, shared, tiered) = tiers();
        let key = CacheKey::new("macro:abc");
        shared.set(&key, json!([1, 2, 3]), Duration::from_secs(60)).await;

        tokio::time::advance(Duration::from_secs(45)).await;

        let (value, remaining) = tiered.get_with_ttl(&key).await.unwrap();
        assert_eq!(value, json!([1, 2, 3]));
        assert_eq!(remaining, Duration::from_secs(15));

        let (_, local_remaining) = local.get_with_ttl(&key).await.unwrap();
        assert_eq!(local_remaining, Duration::from_secs(15));

        // Local copy must not outlive the shared one.
        tokio::time::advance(Duration::from_secs(16)).await;
        assert!(local.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn set_writes_both_tiers() {
        let (local, shared, tiered) = tiers();
        let key = CacheKey::new("k");
        tiered.set(&key, json!("v"), Duration::from_secs(10)).await;

        assert_eq!(local.get(&key).await, Some(json!("v")));
        assert_eq!(shared.get(&key).await, Some(json!("v")));
    }

    #[tokio::test]
    async fn local_hit_skips_shared_tier() {
        let local = Arc::new(MemoryStore::new());
        let failing = Arc::new(FailingStore::new());
        let tiered = TieredStore::new(Arc::clone(&local), failing.clone() as Arc<dyn CacheStore>);
        let key = CacheKey::new("k");

        local.set(&key, json!(1), Duration::from_secs(10)).await;
        assert_eq!(tiered.get(&key).await, Some(json!(1)));
        assert_eq!(failing.reads(), 0);
    }

    #[tokio::test]
    async fn broken_shared_tier_leaves_local_tier_working() {
        let local = Arc::new(MemoryStore::new());
        let failing = Arc::new(FailingStore::new());
        let tiered = TieredStore::new(Arc::clone(&local), failing.clone() as Arc<dyn CacheStore>);
        let key = CacheKey::new("k");

        assert!(tiered.get(&key).await.is_none());
        tiered.set(&key, json!(7), Duration::from_secs(10)).await;
        assert_eq!(tiered.get(&key).await, Some(json!(7)));
        assert_eq!(failing.writes(), 1);
    }

    #[tokio::test]
    async fn delete_and_clear_reach_both_tiers() {
        let (local, shared, tiered) = tiers();
        let a = CacheKey::new("a");
        let b = CacheKey::new("b");
        tiered.set(&a, json!(1), Duration::from_secs(10)).await;
        tiered.set(&b, json!(2), Duration::from_secs(10)).await;

        tiered.delete(&a).await;
        assert!(local.get(&a).await.is_none());
        assert!(shared.get(&a).await.is_none());

        tiered.clear().await;
        assert!(local.is_empty());
        assert!(shared.is_empty());
    }
}
