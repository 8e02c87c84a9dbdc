//! In-memory store backend
//!
//! Keeps raw JSON documents in insertion order, so scans behave like a
//! document database: each record is decoded independently. Call counters
//! and a failing mode make it the store test double.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{RecordError, StoreError};
use crate::models::{Recipe, RecipeChanges, RecipeId};
use crate::store::{RecipeStore, ScanResult};

// == Store Calls ==
/// Snapshot of how many times each store operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub scans: u64,
}

impl StoreCalls {
    /// Sum of all operations.
    pub fn total(&self) -> u64 {
        self.inserts + self.updates + self.deletes + self.scans
    }
}

#[derive(Debug, Default)]
struct Counters {
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    scans: AtomicU64,
}

// == Memory Store ==
/// In-process document collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Value>>,
    counters: Counters,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document as-is, bypassing encoding and call counting.
    pub async fn insert_raw(&self, document: Value) {
        self.documents.write().await.push(document);
    }

    /// When set, every operation fails with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns how many times each operation has been called.
    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            inserts: self.counters.inserts.load(Ordering::SeqCst),
            updates: self.counters.updates.load(Ordering::SeqCst),
            deletes: self.counters.deletes.load(Ordering::SeqCst),
            scans: self.counters.scans.load(Ordering::SeqCst),
        }
    }

    /// Number of stored documents, decodable or not.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

fn id_of(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.counters.inserts.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let document =
            serde_json::to_value(recipe).map_err(|e| StoreError::Encode(e.to_string()))?;
        let mut documents = self.documents.write().await;
        let id = recipe.id.to_string();
        if documents.iter().any(|doc| id_of(doc) == Some(id.as_str())) {
            return Err(StoreError::Rejected(format!("duplicate key {id}")));
        }
        documents.push(document);
        Ok(())
    }

    async fn update(&self, id: &RecipeId, changes: &RecipeChanges) -> Result<u64, StoreError> {
        self.counters.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let id = id.to_string();
        let mut documents = self.documents.write().await;
        let Some(Value::Object(fields)) = documents
            .iter_mut()
            .find(|doc| id_of(doc) == Some(id.as_str()))
        else {
            return Ok(0);
        };

        fields.insert("name".into(), Value::from(changes.name.clone()));
        fields.insert("tags".into(), Value::from(changes.tags.clone()));
        fields.insert("ingredients".into(), Value::from(changes.ingredients.clone()));
        fields.insert("instructions".into(), Value::from(changes.instructions.clone()));
        Ok(1)
    }

    async fn delete(&self, id: &RecipeId) -> Result<u64, StoreError> {
        self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let id = id.to_string();
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|doc| id_of(doc) != Some(id.as_str()));
        Ok((before - documents.len()) as u64)
    }

    async fn scan(&self) -> ScanResult {
        self.counters.scans.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .map(|doc| {
                serde_json::from_value::<Recipe>(doc.clone())
                    .map_err(|e| RecordError::new(id_of(doc).unwrap_or("<unknown>"), e))
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
