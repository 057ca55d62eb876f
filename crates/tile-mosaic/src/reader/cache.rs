//! Shared cache of opened readers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use mosaic_common::MosaicResult;
use tracing::debug;

use super::ReaderKey;

/// Cache of opened readers keyed by (provider, input).
///
/// Lookups and inserts share one lock, so the check-then-open sequence in
/// [`ReaderCache::get_or_open`] is atomic: each key is opened at most once even
/// when many workers ask for it concurrently.
pub struct ReaderCache<R> {
    readers: Mutex<HashMap<ReaderKey, Arc<R>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Counters for a reader cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl<R> ReaderCache<R> {
    pub fn new() -> Self {
        Self {
            readers: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ReaderKey, Arc<R>>> {
        // A panic in an `open` closure leaves the map itself consistent.
        self.readers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached reader for `key`, if any.
    pub fn get(&self, key: &ReaderKey) -> Option<Arc<R>> {
        let reader = self.lock().get(key).cloned();
        match reader {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        reader
    }

    /// Return the cached reader for `key`, opening it with `open` on a miss.
    ///
    /// A failed open is not cached; the next call retries.
    pub fn get_or_open<F>(&self, key: &ReaderKey, open: F) -> MosaicResult<Arc<R>>
    where
        F: FnOnce(&ReaderKey) -> MosaicResult<R>,
    {
        let mut readers = self.lock();
        if let Some(reader) = readers.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(reader));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(
            provider = %key.provider(),
            input = %key.input(),
            "Opening tile reader"
        );
        let reader = Arc::new(open(key)?);
        readers.insert(key.clone(), Arc::clone(&reader));
        Ok(reader)
    }

    /// Drop the reader cached for `key`, returning it.
    pub fn remove(&self, key: &ReaderKey) -> Option<Arc<R>> {
        self.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> ReaderCacheStats {
        ReaderCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<R> Default for ReaderCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ProviderId, TileInput};
    use mosaic_common::MosaicError;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn key(path: &str) -> ReaderKey {
        ReaderKey::new(ProviderId::new("png"), TileInput::file(path))
    }

    #[test]
    fn test_get_or_open_caches() {
        let cache: ReaderCache<String> = ReaderCache::new();
        let opens = AtomicUsize::new(0);
        let open = |k: &ReaderKey| {
            opens.fetch_add(1, Ordering::SeqCst);
            Ok(k.input().to_string())
        };

        let first = cache.get_or_open(&key("a.png"), open).unwrap();
        let second = cache.get_or_open(&key("a.png"), open).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(opens.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_failed_open_not_cached() {
        let cache: ReaderCache<String> = ReaderCache::new();
        let result = cache.get_or_open(&key("bad.png"), |_| Err(MosaicError::malformed("bad")));
        assert!(result.is_err());
        assert!(cache.is_empty());

        let retried = cache.get_or_open(&key("bad.png"), |_| Ok("ok".to_string()));
        assert_eq!(*retried.unwrap(), "ok");
    }

    #[test]
    fn test_concurrent_opens_once_per_key() {
        let cache: Arc<ReaderCache<usize>> = Arc::new(ReaderCache::new());
        let opens = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let opens = Arc::clone(&opens);
                thread::spawn(move || {
                    for i in 0..20 {
                        let k = key(&format!("tile_{}.png", i % 5));
                        cache
                            .get_or_open(&k, |_| {
                                opens.fetch_add(1, Ordering::SeqCst);
                                Ok(i % 5)
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(opens.load(Ordering::SeqCst), 5);
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache: ReaderCache<u8> = ReaderCache::new();
        cache.get_or_open(&key("a"), |_| Ok(1)).unwrap();
        cache.get_or_open(&key("b"), |_| Ok(2)).unwrap();
        assert_eq!(cache.remove(&key("a")).map(|r| *r), Some(1));
        assert!(cache.get(&key("a")).is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
