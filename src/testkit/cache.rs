//! Cache doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapter::outbound::cache::MemoryStore;
use crate::domain::CacheKey;
use crate::port::CacheStore;

/// A store whose backend is permanently unreachable: every read misses and
/// every write is dropped, exactly as the remote tier degrades. Counts the
/// attempts so tests can assert the tier was consulted.
#[derive(Debug, Default)]
pub struct FailingStore {
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn get_with_ttl(&self, _key: &CacheKey) -> Option<(Value, Duration)> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        None
    }

    async fn set(&self, _key: &CacheKey, _value: Value, _ttl: Duration) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    async fn delete(&self, _key: &CacheKey) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    async fn clear(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// An in-process store whose reads answer late, like a shared tier across
/// the network.
///
/// A read observes the store when it starts and returns after `latency`,
/// so a write landing in between is not seen. Writes apply immediately.
pub struct SlowStore {
    inner: Arc<MemoryStore>,
    latency: Duration,
}

impl SlowStore {
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            latency,
        }
    }

    /// The backing store, for inspecting what was written.
    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }
}

#[async_trait]
impl CacheStore for SlowStore {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn get_with_ttl(&self, key: &CacheKey) -> Option<(Value, Duration)> {
        let observed = self.inner.get_with_ttl(key).await;
        tokio::time::sleep(self.latency).await;
        observed
    }

    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) {
        self.inner.set(key, value, ttl).await;
    }

    async fn delete(&self, key: &CacheKey) {
        self.inner.delete(key).await;
    }

    async fn clear(&self) {
        self.inner.clear().await;
    }
}
