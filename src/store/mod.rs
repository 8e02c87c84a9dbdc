//! Store Module
//!
//! The authoritative recipe collection. The service only ever talks to it
//! through [`RecipeStore`], so any document database can sit behind it.

mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

use async_trait::async_trait;

use crate::error::{RecordError, StoreError};
use crate::models::{Recipe, RecipeChanges, RecipeId};

pub use memory::{MemoryStore, StoreCalls};
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

/// Name of the recipe collection.
pub const COLLECTION: &str = "recipes";

/// Result of a full scan: one entry per stored document, in store order.
pub type ScanResult = Result<Vec<Result<Recipe, RecordError>>, StoreError>;

// == Recipe Store ==
/// Durable recipe collection keyed by [`RecipeId`].
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Inserts a new document. Returns once the write is acknowledged.
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError>;

    /// Sets the mutable fields of the matching document.
    ///
    /// Returns the number of documents matched (0 or 1).
    async fn update(&self, id: &RecipeId, changes: &RecipeChanges) -> Result<u64, StoreError>;

    /// Deletes the matching document. Returns the number deleted (0 or 1).
    async fn delete(&self, id: &RecipeId) -> Result<u64, StoreError>;

    /// Reads every document. Documents that fail to decode are returned as
    /// individual errors rather than failing the scan.
    async fn scan(&self) -> ScanResult;

    /// Checks connectivity.
    async fn ping(&self) -> Result<(), StoreError>;
}
