//! MongoDB store backend
//!
//! Recipes live in the `recipes` collection with the recipe id as `_id`.
//! Documents are decoded one at a time so a single bad record cannot fail a
//! scan.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, Collection};
use tracing::info;

use crate::error::{RecordError, StoreError};
use crate::models::{Recipe, RecipeChanges, RecipeId};
use crate::store::{RecipeStore, ScanResult, COLLECTION};

// == Mongo Store ==
/// Store backend backed by a MongoDB collection.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connects to `uri` and verifies the primary answers a ping.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(store_error)?;
        let collection = client.database(database).collection::<Document>(COLLECTION);
        let store = Self {
            client,
            database: database.to_string(),
            collection,
        };
        store.ping().await?;
        info!("Connected to MongoDB");
        Ok(store)
    }
}

fn store_error(err: MongoError) -> StoreError {
    match *err.kind {
        ErrorKind::Write(_) => StoreError::Rejected(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn to_document(recipe: &Recipe) -> Result<Document, StoreError> {
    let mut document = bson::to_document(recipe).map_err(|e| StoreError::Encode(e.to_string()))?;
    if let Some(id) = document.remove("id") {
        document.insert("_id", id);
    }
    Ok(document)
}

fn from_document(mut document: Document) -> Result<Recipe, RecordError> {
    let id = match document.remove("_id") {
        Some(id) => id,
        None => return Err(RecordError::new("<unknown>", "missing _id")),
    };
    let raw_id = match &id {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    };
    document.insert("id", id);
    bson::from_document(document).map_err(|e| RecordError::new(raw_id, e))
}

#[async_trait]
impl RecipeStore for MongoStore {
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.collection
            .insert_one(to_document(recipe)?)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update(&self, id: &RecipeId, changes: &RecipeChanges) -> Result<u64, StoreError> {
        let update = doc! {
            "$set": {
                "name": changes.name.clone(),
                "instructions": changes.instructions.clone(),
                "ingredients": changes.ingredients.clone(),
                "tags": changes.tags.clone(),
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id.to_string() }, update)
            .await
            .map_err(store_error)?;
        Ok(result.matched_count)
    }

    async fn delete(&self, id: &RecipeId) -> Result<u64, StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count)
    }

    async fn scan(&self) -> ScanResult {
        let mut cursor = self.collection.find(doc! {}).await.map_err(store_error)?;
        let mut records = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(store_error)? {
            records.push(from_document(document));
        }
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
