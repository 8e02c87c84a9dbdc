//! Cache Statistics Module
//!
//! Tracks cache usage counters for the in-memory backend.

// == Cache Stats ==
/// Tracks cache usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found the key
    pub hits: u64,
    /// Reads that found no key
    pub misses: u64,
    /// Operations that failed
    pub faults: u64,
    /// Successful writes
    pub sets: u64,
    /// Writes dropped because the key was invalidated after its generation was read
    pub stale_sets: u64,
    /// Delete calls, whether or not the key existed
    pub deletes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Fault ==
    /// Increments the fault counter.
    pub fn record_fault(&mut self) {
        self.faults += 1;
    }

    // == Record Set ==
    /// Increments the write counter.
    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    // == Record Stale Set ==
    /// Increments the dropped-write counter.
    pub fn record_stale_set(&mut self) {
        self.stale_sets += 1;
    }

    // == Record Delete ==
    /// Increments the delete counter.
    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }
}
