//! In-process cache tier.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::domain::CacheKey;
use crate::port::CacheStore;

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Thread-safe in-process store bounded by process lifetime.
///
/// Expiry is enforced on read. The optional sweeper only reclaims memory
/// held by entries nobody has read since they expired.
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryStore {
    /// Create an empty store without a sweeper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            sweeper: Mutex::new(None),
        }
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Start the periodic sweep on the current Tokio runtime.
    ///
    /// The task holds only a weak reference, so it ends on its own once the
    /// store is dropped. Calling this again replaces the running sweeper.
    pub fn start_sweeper(self: &Arc<Self>, every: Duration) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(store) = weak.upgrade() else {
                    break;
                };
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "Swept expired cache entries");
                }
            }
        });

        if let Some(previous) = self.sweeper.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the sweeper if one is running.
    pub fn stop_sweeper(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
    }

    /// Whether a sweeper task is currently attached.
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

/// Longest lifetime an entry can have; longer TTLs are clamped to it.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 86_400);

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_TTL))
        .or_else(|| now.checked_add(MAX_TTL))
        .unwrap_or(now)
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_with_ttl(&self, key: &CacheKey) -> Option<(Value, Duration)> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key.as_str()) {
            if entry.expires_at > now {
                return Some((entry.value.clone(), entry.expires_at - now));
            }
        }

        // Stale or absent; drop it opportunistically.
        if self
            .entries
            .remove_if(key.as_str(), |_, entry| entry.expires_at <= now)
            .is_some()
        {
            trace!(key = %key, "Removed expired cache entry on read");
        }
        None
    }

    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) {
        let expires_at = expiry(Instant::now(), ttl);
        self.entries
            .insert(key.as_str().to_owned(), Entry { value, expires_at });
    }

    async fn delete(&self, key: &CacheKey) {
        self.entries.remove(key.as_str());
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}
