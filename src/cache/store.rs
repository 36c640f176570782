use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The single cached value for a scope, stamped with its capture time
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: Arc<T>,
    pub timestamp_ms: i64,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            timestamp_ms: self.timestamp_ms,
        }
    }
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, timestamp_ms: i64) -> Self {
        Self { payload: Arc::new(payload), timestamp_ms }
    }

    /// Never negative, even when the clock is behind the stamp
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.timestamp_ms).max(0)
    }

    /// An entry stamped in the future (clock moved back, or a persisted file written
    /// by another machine) is stale, so the next read refetches and re-stamps it.
    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        self.timestamp_ms <= now_ms && now_ms - self.timestamp_ms < ttl_ms
    }
}

/// Holder for one cache slot
pub trait CacheStore<T>: Send + Sync {
    fn load(&self) -> Option<CacheEntry<T>>;
    fn store(&self, entry: CacheEntry<T>);
    fn clear(&self);
}

/// Process-local slot
pub struct MemoryStore<T> {
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self { slot: Mutex::new(None) }
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Send + Sync> CacheStore<T> for MemoryStore<T> {
    fn load(&self) -> Option<CacheEntry<T>> {
        match self.slot.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, entry: CacheEntry<T>) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(entry),
            Err(poisoned) => *poisoned.into_inner() = Some(entry),
        }
    }

    fn clear(&self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

/// Durable slot backed by `<dir>/<key>.json`.
///
/// Unreadable or malformed files count as a miss. Write failures are logged and dropped,
/// the caller still gets its freshly fetched payload.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self { path: dir.as_ref().join(format!("{}.json", key)) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> CacheStore<T> for FileStore
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Option<CacheEntry<T>> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice::<CacheEntry<T>>(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Ignoring unreadable cache file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn store(&self, entry: CacheEntry<T>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create cache directory {:?}: {}", parent, e);
                return;
            }
        }
        let written = serde_json::to_vec(&entry)
            .map_err(|e| e.to_string())
            .and_then(|bytes| fs::write(&self.path, bytes).map_err(|e| e.to_string()));
        if let Err(e) = written {
            warn!("Failed to persist cache file {:?}: {}", self.path, e);
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("Failed to remove cache file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_is_strictly_less_than_ttl() {
        let entry = CacheEntry::new(1u8, 1_000);
        assert!(entry.is_fresh(60_999, 60_000));
        assert!(!entry.is_fresh(61_000, 60_000));
    }

    #[test]
    fn future_stamped_entry_is_stale_with_zero_age() {
        let entry = CacheEntry::new(1u8, 1_000);
        assert_eq!(entry.age_ms(995), 0);
        assert!(!entry.is_fresh(995, 60_000));
        assert!(entry.is_fresh(1_000, 60_000));
    }

    #[test]
    fn file_store_survives_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStore::new(dir.path(), "pools");
        CacheStore::<Vec<u32>>::store(&first, CacheEntry::new(vec![1, 2, 3], 42));

        let second = FileStore::new(dir.path(), "pools");
        let loaded: CacheEntry<Vec<u32>> = second.load().unwrap();
        assert_eq!(*loaded.payload, vec![1, 2, 3]);
        assert_eq!(loaded.timestamp_ms, 42);
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "pools");
        fs::write(store.path(), b"{not json").unwrap();

        let loaded: Option<CacheEntry<Vec<u32>>> = store.load();
        assert!(loaded.is_none());
    }

    #[test]
    fn memory_store_clear_empties_the_slot() {
        let store = MemoryStore::new();
        store.store(CacheEntry::new("x".to_string(), 0));
        assert!(store.load().is_some());
        store.clear();
        assert!(store.load().is_none());
    }
}
