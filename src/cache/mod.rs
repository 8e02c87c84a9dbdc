//! Cache Module
//!
//! The listing cache: a keyed slot store holding the serialized full recipe
//! listing, with explicit get/set/delete and no expiry.
//!
//! Every key carries a generation counter that `delete` advances. A reader
//! takes the generation before it reads the store and hands it back to
//! `set`, which drops the write if an invalidation happened in between. A
//! listing scanned before a write can therefore never land in the cache
//! after that write was acknowledged.

mod memory;
#[cfg(feature = "redis")]
mod redis_cache;
mod stats;

use async_trait::async_trait;

use crate::error::CacheError;

// Re-export public types
pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
pub use stats::CacheStats;

// == Public Constants ==
/// The single cache key holding the full recipe listing
pub const LISTING_KEY: &str = "recipes";

// == Cache Lookup ==
/// Outcome of a cache read.
///
/// An absent key is a `Miss`, never a `Fault`.
#[derive(Debug)]
pub enum CacheLookup {
    /// Key present with this payload
    Hit(String),
    /// Key absent
    Miss,
    /// The cache could not be read
    Fault(CacheError),
}

// == Listing Cache ==
/// Cache backend holding serialized listings.
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Reads a key.
    async fn get(&self, key: &str) -> CacheLookup;

    /// Current generation of a key. A key never invalidated is at 0.
    async fn generation(&self, key: &str) -> Result<u64, CacheError>;

    /// Writes a key with no expiry, overwriting any previous value, provided
    /// its generation still equals `generation`.
    ///
    /// Returns `false` when the write was dropped as stale.
    async fn set(&self, key: &str, value: String, generation: u64) -> Result<bool, CacheError>;

    /// Unconditionally removes a key and advances its generation. Removing
    /// an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Checks connectivity.
    async fn ping(&self) -> Result<(), CacheError>;
}
