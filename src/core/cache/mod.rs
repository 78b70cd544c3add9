//! Memo table for merged pieces.
//!
//! The cached function is pure, so a race between two threads computing the
//! same piece only wastes work: whichever value lands first is kept and both
//! callers observe an identical result.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheConfig {
    /// Grow for the lifetime of the encoder. Fine for short-lived processes.
    #[default]
    Unbounded,
    /// Keep at most this many pieces, evicting the least recently used.
    Lru(NonZeroUsize),
}

impl CacheConfig {
    /// `0` means unbounded.
    pub fn from_capacity(capacity: usize) -> Self {
        NonZeroUsize::new(capacity).map_or(Self::Unbounded, Self::Lru)
    }
}

enum Store {
    Unbounded(RwLock<HashMap<String, Arc<str>>>),
    Lru(Mutex<LruCache<String, Arc<str>>>),
}

pub struct MergeCache {
    store: Store,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MergeCache {
    pub fn new(config: CacheConfig) -> Self {
        let store = match config {
            CacheConfig::Unbounded => Store::Unbounded(RwLock::new(HashMap::new())),
            CacheConfig::Lru(cap) => Store::Lru(Mutex::new(LruCache::new(cap))),
        };

        Self {
            store,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        match &self.store {
            Store::Unbounded(map) => map.read().get(key).cloned(),
            Store::Lru(lru) => lru.lock().get(key).cloned(),
        }
    }

    /// Returns the cached value for `key`, computing it with `compute` on a
    /// miss. The lock is not held while `compute` runs.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> Arc<str>
    where
        F: FnOnce() -> String,
    {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(piece = key, "merge cache miss");
        let value: Arc<str> = compute().into();

        match &self.store {
            Store::Unbounded(map) => map
                .write()
                .entry(key.to_string())
                .or_insert(value)
                .clone(),
            Store::Lru(lru) => lru
                .lock()
                .get_or_insert(key.to_string(), || value)
                .clone(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded(map) => map.read().len(),
            Store::Lru(lru) => lru.lock().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        match &self.store {
            Store::Unbounded(_) => None,
            Store::Lru(lru) => Some(lru.lock().cap().get()),
        }
    }

    pub fn clear(&self) {
        match &self.store {
            Store::Unbounded(map) => map.write().clear(),
            Store::Lru(lru) => lru.lock().clear(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for MergeCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    /// `None` when unbounded.
    pub capacity: Option<usize>,
    pub hits: u64,
    pub misses: u64,
}
