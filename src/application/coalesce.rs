//! Request coalescing.
//!
//! Maps an in-flight key to the single shared operation serving every
//! concurrent caller for that key.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::CacheKey;
use crate::error::FetchError;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

/// Registry of in-flight operations, one per key.
///
/// The check-then-insert step runs under a single mutex, so two concurrent
/// misses for the same key can never both start an operation. The mutex is
/// never held across an await point.
///
/// Each operation runs on its own Tokio task. A caller that stops waiting
/// does not cancel it; the remaining callers still receive the result.
/// The registry entry is removed when the operation settles, whether it
/// succeeded, failed or panicked.
pub struct Coalescer<T> {
    label: &'static str,
    inflight: Mutex<HashMap<CacheKey, SharedFetch<T>>>,
}

/// Removes a key from the registry when the owning task finishes.
struct Deregister<T> {
    registry: Arc<Coalescer<T>>,
    key: CacheKey,
}

impl<T> Drop for Deregister<T> {
    fn drop(&mut self) {
        self.registry.inflight.lock().remove(&self.key);
    }
}

impl<T> Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty registry. `label` names it in logs.
    #[must_use]
    pub fn new(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            inflight: Mutex::new(HashMap::new()),
        })
    }

    /// Join the in-flight operation for `key`, or start one with `start`.
    ///
    /// `start` is only invoked when no operation was registered for `key`,
    /// and never while the registry is locked, so it may use the registry
    /// itself. If another caller registers first in the meantime, the
    /// future `start` built is dropped unpolled and that caller's operation
    /// is joined instead.
    pub async fn run<F, Fut>(self: &Arc<Self>, key: &CacheKey, start: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let existing = self.inflight.lock().get(key).cloned();
        if let Some(operation) = existing {
            debug!(registry = self.label, key = %key, "Joined in-flight request");
            return operation.await;
        }

        let pending = start();
        let operation = {
            let mut inflight = self.inflight.lock();
            match inflight.get(key) {
                Some(existing) => {
                    debug!(registry = self.label, key = %key, "Joined in-flight request");
                    existing.clone()
                }
                None => {
                    let operation = self.spawn(key.clone(), pending);
                    inflight.insert(key.clone(), operation.clone());
                    operation
                }
            }
        };
        operation.await
    }

    fn spawn<Fut>(self: &Arc<Self>, key: CacheKey, operation: Fut) -> SharedFetch<T>
    where
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let guard = Deregister {
            registry: Arc::clone(self),
            key,
        };
        let handle = tokio::spawn(async move {
            let _guard = guard;
            operation.await
        });

        async move {
            handle
                .await
                .unwrap_or_else(|e| Err(FetchError::Aborted(e.to_string())))
        }
        .boxed()
        .shared()
    }

    /// Number of operations currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Whether an operation for `key` is in flight.
    #[must_use]
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.inflight.lock().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn key(s: &str) -> CacheKey {
        CacheKey::new(s)
    }

    async fn slow_value(calls: Arc<AtomicUsize>, value: u32) -> Result<u32, FetchError> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_operation() {
        let registry = Coalescer::<u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    registry
                        .run(&key("quote:SPY"), || slow_value(calls, 42))
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_do_not_coalesce() {
        let registry = Coalescer::<u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let (ka, kb) = (key("a"), key("b"));
        let a = registry.run(&ka, || slow_value(Arc::clone(&calls), 1));
        let b = registry.run(&kb, || slow_value(Arc::clone(&calls), 2));
        let (a, b) = tokio::join!(a, b);

        assert_eq!((a, b), (Ok(1), Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_shared_and_entry_removed() {
        let registry = Coalescer::<u32>::new("test");
        let failure = FetchError::Provider(ProviderError::RateLimited { provider: "polygon" });

        let make = || {
            let failure = failure.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<u32, _>(failure)
            }
        };
        let k = key("k");
        let first = registry.run(&k, make);
        let second = registry.run(&k, || async { Ok::<u32, FetchError>(7) });
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, Err(failure.clone()));
        assert_eq!(second, Err(failure));
        assert!(!registry.is_in_flight(&k));
    }

    #[tokio::test(start_paused = true)]
    async fn settled_key_starts_fresh_operation() {
        let registry = Coalescer::<u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        registry
            .run(&key("k"), || slow_value(Arc::clone(&calls), 1))
            .await
            .unwrap();
        registry
            .run(&key("k"), || slow_value(Arc::clone(&calls), 2))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_caller_does_not_cancel_operation() {
        let registry = Coalescer::<u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            registry.run(&key("k"), || slow_value(Arc::clone(&calls), 5)),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(registry.is_in_flight(&key("k")));

        // A later caller joins the surviving operation instead of starting another.
        let joined = registry
            .run(&key("k"), || slow_value(Arc::clone(&calls), 6))
            .await;
        assert_eq!(joined, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_may_consult_the_registry() {
        let registry = Coalescer::<u32>::new("test");
        let k = key("k");

        let value = registry
            .run(&k, || {
                let busy = registry.in_flight();
                async move { Ok(u32::try_from(busy).unwrap_or(u32::MAX)) }
            })
            .await;

        assert_eq!(value, Ok(0));
        assert!(!registry.is_in_flight(&k));
    }

    async fn explode() -> Result<u32, FetchError> {
        panic!("vendor adapter bug")
    }

    #[tokio::test]
    async fn panicking_operation_reports_abort_and_clears_entry() {
        let registry = Coalescer::<u32>::new("test");

        let result = registry.run(&key("k"), explode).await;

        assert!(matches!(result, Err(FetchError::Aborted(_))));
        assert_eq!(registry.in_flight(), 0);
    }
}
