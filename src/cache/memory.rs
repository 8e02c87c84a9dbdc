//! In-memory cache backend
//!
//! Keyed slots held in process memory with no expiry. Counts every operation
//! and can be switched into a failing mode, which makes it the test double
//! for cache behaviour as well as the default backend for local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheLookup, CacheStats, ListingCache};
use crate::error::CacheError;

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<String, String>,
    generations: HashMap<String, u64>,
    stats: CacheStats,
}

// == Memory Cache ==
/// In-process cache backend.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: RwLock<Slots>,
    failing: AtomicBool,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with `CacheError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of the usage counters.
    pub async fn stats(&self) -> CacheStats {
        self.slots.read().await.stats.clone()
    }

    /// Reads a slot without touching the counters.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.slots.read().await.entries.get(key).cloned()
    }

    /// Number of occupied slots.
    pub async fn len(&self) -> usize {
        self.slots.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheLookup {
        let mut slots = self.slots.write().await;
        if self.is_failing() {
            slots.stats.record_fault();
            return CacheLookup::Fault(CacheError::Unavailable("memory cache offline".into()));
        }

        match slots.entries.get(key).cloned() {
            Some(value) => {
                slots.stats.record_hit();
                CacheLookup::Hit(value)
            }
            None => {
                slots.stats.record_miss();
                CacheLookup::Miss
            }
        }
    }

    async fn generation(&self, key: &str) -> Result<u64, CacheError> {
        let slots = self.slots.read().await;
        if self.is_failing() {
            return Err(CacheError::Unavailable("memory cache offline".into()));
        }
        Ok(slots.generations.get(key).copied().unwrap_or(0))
    }

    async fn set(&self, key: &str, value: String, generation: u64) -> Result<bool, CacheError> {
        let mut slots = self.slots.write().await;
        if self.is_failing() {
            slots.stats.record_fault();
            return Err(CacheError::Unavailable("memory cache offline".into()));
        }

        // Compared under the write lock, so no delete can interleave
        let current = slots.generations.get(key).copied().unwrap_or(0);
        if current != generation {
            slots.stats.record_stale_set();
            return Ok(false);
        }

        slots.entries.insert(key.to_string(), value);
        slots.stats.record_set();
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut slots = self.slots.write().await;
        if self.is_failing() {
            slots.stats.record_fault();
            return Err(CacheError::Unavailable("memory cache offline".into()));
        }

        slots.entries.remove(key);
        *slots.generations.entry(key.to_string()).or_insert(0) += 1;
        slots.stats.record_delete();
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        if self.is_failing() {
            return Err(CacheError::Unavailable("memory cache offline".into()));
        }
        Ok(())
    }
}
