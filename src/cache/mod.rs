//! Read-through caching of remote query results.
//!
//! One [`ReadThroughCache`] owns exactly one slot. The server keeps a process-wide
//! instance over a [`MemoryStore`]; the dashboard keeps one over a [`FileStore`] so the
//! slot outlives a single invocation.
//!
//! The slot is locked only while it is read or written, never while the remote fetch
//! is in flight. Two concurrent refreshes can therefore both reach the remote source
//! and both write the slot; the last write wins. Entries are never evicted, a stale
//! entry is simply ignored until a successful fetch replaces it.

mod clock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntry, CacheStore, FileStore, MemoryStore};

use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;

/// Default freshness window for pool listings
pub const DEFAULT_TTL_MS: i64 = 60_000;

/// A payload handed out by the cache
#[derive(Debug)]
pub struct Cached<T> {
    pub payload: Arc<T>,
    pub served_from_cache: bool,
    /// Age of the entry when served from cache
    pub age_ms: Option<i64>,
}

pub struct ReadThroughCache<T> {
    store: Box<dyn CacheStore<T>>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl<T: Send + Sync + 'static> ReadThroughCache<T> {
    pub fn new(store: impl CacheStore<T> + 'static, clock: Arc<dyn Clock>, ttl_ms: i64) -> Self {
        Self {
            store: Box::new(store),
            clock,
            ttl_ms,
        }
    }

    /// Serve the current entry if it is fresh and `force` is false, otherwise run `fetch`
    /// and replace the entry with its result.
    ///
    /// A failed fetch leaves the existing entry untouched and returns the error.
    pub async fn get<F, Fut>(&self, force: bool, fetch: F) -> Result<Cached<T>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if !force {
            if let Some(entry) = self.store.load() {
                let now = self.clock.now_millis();
                if entry.is_fresh(now, self.ttl_ms) {
                    let age = entry.age_ms(now);
                    debug!("Serving cached entry ({} ms old)", age);
                    return Ok(Cached {
                        payload: entry.payload,
                        served_from_cache: true,
                        age_ms: Some(age),
                    });
                }
            }
        }

        let payload = match fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Cache refresh failed, keeping previous entry: {}", e);
                return Err(e);
            }
        };

        let entry = CacheEntry::new(payload, self.clock.now_millis());
        let payload = Arc::clone(&entry.payload);
        self.store.store(entry);

        Ok(Cached {
            payload,
            served_from_cache: false,
            age_ms: None,
        })
    }

    /// Current entry regardless of freshness
    pub fn peek(&self) -> Option<CacheEntry<T>> {
        self.store.load()
    }

    pub fn set(&self, payload: T) {
        self.store.store(CacheEntry::new(payload, self.clock.now_millis()));
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        clock: Arc<ManualClock>,
        cache: ReadThroughCache<Vec<u32>>,
        calls: AtomicUsize,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new(1_000_000));
            let cache = ReadThroughCache::new(MemoryStore::new(), clock.clone(), DEFAULT_TTL_MS);
            Self { clock, cache, calls: AtomicUsize::new(0) }
        }

        async fn get(&self, force: bool) -> Result<Cached<Vec<u32>>, ApiError> {
            self.cache
                .get(force, || async {
                    let n = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
                    Ok(vec![n])
                })
                .await
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn fresh_reads_return_the_same_payload_without_fetching() {
        let f = Fixture::new();
        let first = f.get(false).await.unwrap();
        assert!(!first.served_from_cache);

        f.clock.advance(59_999);
        let second = f.get(false).await.unwrap();
        assert!(second.served_from_cache);
        assert_eq!(second.age_ms, Some(59_999));
        assert!(Arc::ptr_eq(&first.payload, &second.payload));
        assert_eq!(f.calls(), 1);
    }

    #[tokio::test]
    async fn expired_entry_triggers_one_fetch_and_restamps() {
        let f = Fixture::new();
        f.get(false).await.unwrap();

        f.clock.advance(60_000);
        let refreshed = f.get(false).await.unwrap();
        assert!(!refreshed.served_from_cache);
        assert_eq!(*refreshed.payload, vec![1]);
        assert_eq!(f.calls(), 2);
        assert_eq!(f.cache.peek().unwrap().timestamp_ms, 1_060_000);

        let again = f.get(false).await.unwrap();
        assert!(again.served_from_cache);
        assert_eq!(f.calls(), 2);
    }

    #[tokio::test]
    async fn force_always_fetches() {
        let f = Fixture::new();
        f.get(false).await.unwrap();
        let forced = f.get(true).await.unwrap();
        assert!(!forced.served_from_cache);
        assert_eq!(f.calls(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_stale_entry() {
        let f = Fixture::new();
        f.get(false).await.unwrap();
        f.clock.advance(120_000);

        let err = f
            .cache
            .get(false, || async { Err(ApiError::transport("RPC unavailable", "timeout")) })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));

        let stale = f.cache.peek().unwrap();
        assert_eq!(*stale.payload, vec![0]);
        assert_eq!(stale.timestamp_ms, 1_000_000);
    }

    #[tokio::test]
    async fn set_primes_the_slot_and_clear_empties_it() {
        let f = Fixture::new();
        f.cache.set(vec![3]);

        let primed = f.get(false).await.unwrap();
        assert!(primed.served_from_cache);
        assert_eq!(*primed.payload, vec![3]);
        assert_eq!(f.calls(), 0);

        f.cache.clear();
        assert!(f.cache.peek().is_none());
        let fetched = f.get(false).await.unwrap();
        assert!(!fetched.served_from_cache);
        assert_eq!(*fetched.payload, vec![0]);
        assert_eq!(f.calls(), 1);
    }

    #[tokio::test]
    async fn clock_moving_back_refetches_instead_of_reporting_negative_age() {
        let f = Fixture::new();
        f.get(false).await.unwrap();

        f.clock.advance(-5);
        let after = f.get(false).await.unwrap();
        assert!(!after.served_from_cache);
        assert_eq!(f.calls(), 2);
        assert_eq!(f.cache.peek().unwrap().timestamp_ms, 999_995);

        let hit = f.get(false).await.unwrap();
        assert_eq!(hit.age_ms, Some(0));
    }

    #[tokio::test]
    async fn file_backed_cache_is_shared_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(5_000));

        let first: ReadThroughCache<Vec<u32>> =
            ReadThroughCache::new(FileStore::new(dir.path(), "pools"), clock.clone(), DEFAULT_TTL_MS);
        first.get(false, || async { Ok(vec![7]) }).await.unwrap();

        let second: ReadThroughCache<Vec<u32>> =
            ReadThroughCache::new(FileStore::new(dir.path(), "pools"), clock.clone(), DEFAULT_TTL_MS);
        let hit = second
            .get(false, || async { panic!("fresh persisted entry should be served") })
            .await
            .unwrap();
        assert!(hit.served_from_cache);
        assert_eq!(*hit.payload, vec![7]);
    }
}
