//! Bounded, thread-safe memo of decompressed chunks.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use crate::{Error, Result};

pub type Chunk = Arc<Vec<u8>>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub resident: usize,
}

/// Least-recently-used cache keyed by chunk number.
///
/// Never holds more than `capacity` chunks. A capacity of 0 disables caching:
/// every lookup misses and inserts are dropped.
pub struct ChunkCache {
    entries: Option<Mutex<Entries>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ChunkCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Looks up chunk `i` and marks it most recently used.
    pub fn get(&self, i: usize) -> Result<Option<Chunk>> {
        let found = match &self.entries {
            Some(entries) => lock(entries)?.get(&i).cloned(),
            None => None,
        };
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(found)
    }

    /// Inserts chunk `i`, returning the key evicted to make room, if any.
    pub fn insert(&self, i: usize, chunk: Chunk) -> Result<Option<usize>> {
        let Some(entries) = &self.entries else {
            return Ok(None);
        };
        let evicted = match lock(entries)?.push(i, chunk) {
            Some((key, _)) if key != i => Some(key),
            _ => None,
        };
        if evicted.is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        Ok(evicted)
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            Some(entries) => entries.lock().map(|guard| guard.len()).unwrap_or(0),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resident keys, most recently used first.
    pub fn keys(&self) -> Result<Vec<usize>> {
        match &self.entries {
            Some(entries) => Ok(lock(entries)?.iter().map(|(key, _)| *key).collect()),
            None => Ok(Vec::new()),
        }
    }

    pub fn clear(&self) -> Result<()> {
        if let Some(entries) = &self.entries {
            lock(entries)?.clear();
        }
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            resident: self.len(),
        }
    }
}

type Entries = LruCache<usize, Chunk>;

fn lock(entries: &Mutex<Entries>) -> Result<MutexGuard<'_, Entries>> {
    entries.lock().map_err(|_| Error::poisoned("chunk cache"))
}
