//! TTL cache with in-flight request deduplication.
//!
//! Concurrent misses on one key share a single fetch. A completed fetch is
//! kept for the TTL; a failed one reaches the callers already waiting on it
//! and is then cached as the default (absent) value, so a failing upstream
//! is retried at most once per TTL window.

use crate::base::GatewayError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, GatewayError>>>;

enum Slot<V> {
    Pending { fetch: SharedFetch<V>, generation: u64 },
    Ready { value: V, expires_at: Instant, generation: u64 },
}

impl<V> Slot<V> {
    fn generation(&self) -> u64 {
        match self {
            Slot::Pending { generation, .. } | Slot::Ready { generation, .. } => *generation,
        }
    }
}

enum Probe<V> {
    Hit(V),
    Wait(SharedFetch<V>),
    Stale,
}

pub struct TtlCache<K, V> {
    entries: Arc<DashMap<K, Slot<V>>>,
    ttl: Duration,
    generation: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Arc::new(DashMap::new()), ttl, generation: AtomicU64::new(0) }
    }

    /// Get the cached value for `key`, or run `fetch` to produce it.
    ///
    /// `fetch` runs at most once per key while a previous fetch is pending
    /// or its result is fresh.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, GatewayError>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, GatewayError>> + Send + 'static,
    {
        let pending = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let probe = match occupied.get() {
                    Slot::Ready { value, expires_at, .. } if *expires_at > Instant::now() => {
                        Probe::Hit(value.clone())
                    }
                    Slot::Pending { fetch: pending, .. } => Probe::Wait(pending.clone()),
                    Slot::Ready { .. } => Probe::Stale,
                };
                match probe {
                    Probe::Hit(value) => return Ok(value),
                    Probe::Wait(pending) => pending,
                    Probe::Stale => {
                        let (slot, pending) = self.start(key, fetch);
                        occupied.insert(slot);
                        pending
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let (slot, pending) = self.start(key, fetch);
                vacant.insert(slot);
                pending
            }
        };
        pending.await
    }

    fn start<F, Fut>(&self, key: K, fetch: F) -> (Slot<V>, SharedFetch<V>)
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, GatewayError>> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);
        let ttl = self.ttl;
        let fut = fetch(key.clone());

        let task = tokio::spawn(async move {
            let result = fut.await;
            let value = match &result {
                Ok(value) => value.clone(),
                Err(e) => {
                    tracing::warn!(key = ?key, error = %e, "fetch failed, caching as absent");
                    V::default()
                }
            };
            if let Some(mut slot) = entries.get_mut(&key) {
                if slot.generation() == generation {
                    *slot = Slot::Ready { value, expires_at: Instant::now() + ttl, generation };
                }
            }
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                entries.remove_if(&key, |_, slot| {
                    matches!(slot, Slot::Ready { .. }) && slot.generation() == generation
                });
            });
            result
        });

        let pending = async move {
            task.await
                .unwrap_or_else(|e| Err(GatewayError::upstream("cache", format!("fetch task failed: {}", e))))
        }
        .boxed()
        .shared();

        (Slot::Pending { fetch: pending.clone(), generation }, pending)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counted(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce(&'static str) -> BoxFuture<'static, Result<u32, GatewayError>> {
        let calls = Arc::clone(calls);
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_share_fetch() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_secs(5));
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get_or_fetch("usdc", counted(&calls, 1)),
            cache.get_or_fetch("usdc", counted(&calls, 2)),
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_secs(5));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("usdc", counted(&calls, 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_or_fetch("usdc", counted(&calls, 2)).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_after_ttl() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_secs(5));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("usdc", counted(&calls, 1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(cache.get_or_fetch("usdc", counted(&calls, 2)).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_cached_as_absent() {
        let cache: TtlCache<&'static str, Option<u32>> = TtlCache::new(Duration::from_secs(5));

        let first = cache
            .get_or_fetch("usdc", |_| async { Err(GatewayError::upstream("usdc", "boom")) })
            .await;
        assert!(matches!(first, Err(GatewayError::UpstreamFailure { .. })));

        let second = cache.get_or_fetch("usdc", |_| async { Ok(Some(7)) }).await;
        assert_eq!(second.unwrap(), None);

        tokio::time::sleep(Duration::from_secs(6)).await;
        let third = cache.get_or_fetch("usdc", |_| async { Ok(Some(7)) }).await;
        assert_eq!(third.unwrap(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_evicted() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_secs(5));
        cache.get_or_fetch("usdc", |_| async { Ok(1) }).await.unwrap();
        assert_eq!(cache.len(), 1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_debug_reports_size() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_secs(5));
        cache.get_or_fetch("usdc", |_| async { Ok(1) }).await.unwrap();
        assert_eq!(format!("{:?}", cache), "TtlCache { entries: 1, ttl: 5s }");
    }
}
