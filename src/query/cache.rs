use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use lru::LruCache;
use parking_lot::Mutex;
use crate::search::results::ScoredRecord;

/// Ranked hits of a global text search, keyed by normalized query text.
/// Lives inside one `SearchIndex`, so a rebuild starts cold.
pub struct QueryCache {
    cache: Option<Mutex<LruCache<String, Arc<Vec<ScoredRecord>>>>>,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl QueryCache {
    /// A capacity of zero disables caching
    pub fn new(capacity: usize) -> Self {
        QueryCache {
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> Arc<Vec<ScoredRecord>>
    where
        F: FnOnce() -> Vec<ScoredRecord>,
    {
        let Some(cache) = &self.cache else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            return Arc::new(compute());
        };

        if let Some(results) = cache.lock().get(key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(results);
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        // Computed outside the lock
        let results = Arc::new(compute());
        cache.lock().put(key.to_string(), Arc::clone(&results));
        results
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.cache.as_ref().map(|c| c.lock().len()).unwrap_or(0),
            capacity: self.cache.as_ref().map(|c| c.lock().cap().get()).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
