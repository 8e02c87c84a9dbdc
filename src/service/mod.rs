//! Recipe Service
//!
//! Orchestrates the store and the listing cache. The store is the source of
//! truth; the cache holds one derived snapshot of the full listing under
//! [`LISTING_KEY`].
//!
//! # Coherence rules
//! - A write invalidates the listing only after the store acknowledged it,
//!   and never when the store write failed.
//! - A failed invalidation does not fail the write; it is logged.
//! - A faulty cache is never written to on the read path.
//! - A listing is cached only if no invalidation happened between taking the
//!   cache generation and finishing the store scan.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::Authorized;
use crate::cache::{CacheLookup, ListingCache, LISTING_KEY};
use crate::error::{CacheError, Result, ServiceError};
use crate::models::{HealthResponse, NewRecipe, Recipe, RecipeChanges, RecipeId};
use crate::store::RecipeStore;


// == Invalidation Policy ==
/// Which writes clear the listing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// Only create invalidates. Updates and deletes leave the cached
    /// listing stale until the next create.
    CreateOnly,
    /// Create, update and delete all invalidate.
    #[default]
    AllWrites,
}

impl FromStr for InvalidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create-only" | "create_only" => Ok(InvalidationPolicy::CreateOnly),
            "all-writes" | "all_writes" => Ok(InvalidationPolicy::AllWrites),
            other => Err(format!("unknown invalidation policy: {other}")),
        }
    }
}

// == Recipe Service ==
/// Cache-coherent recipe operations. Immutable after construction.
#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    cache: Arc<dyn ListingCache>,
    policy: InvalidationPolicy,
}

impl RecipeService {
    /// Creates a service over the given backends.
    pub fn new(
        store: Arc<dyn RecipeStore>,
        cache: Arc<dyn ListingCache>,
        policy: InvalidationPolicy,
    ) -> Self {
        Self {
            store,
            cache,
            policy,
        }
    }

    /// The active invalidation policy.
    pub fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    // == Create ==
    /// Validates and stores a new recipe, then clears the listing cache.
    pub async fn create(&self, auth: &Authorized, draft: NewRecipe) -> Result<Recipe> {
        if let Some(error_msg) = draft.validate() {
            return Err(ServiceError::Validation(error_msg));
        }

        let recipe = Recipe::publish(draft, RecipeId::generate(), Utc::now());
        self.store.insert(&recipe).await?;
        info!(id = %recipe.id, subject = auth.subject(), "Recipe created");

        self.invalidate().await;
        Ok(recipe)
    }

    // == List ==
    /// Returns every recipe, from the cache when possible.
    ///
    /// Ordering may differ between a cached and a freshly scanned listing.
    pub async fn list(&self) -> Result<Vec<Recipe>> {
        match self.cache.get(LISTING_KEY).await {
            CacheLookup::Hit(payload) => match serde_json::from_str::<Vec<Recipe>>(&payload) {
                Ok(recipes) => {
                    debug!(count = recipes.len(), "Listing served from cache");
                    Ok(recipes)
                }
                Err(err) => {
                    let err = CacheError::Corrupt(err.to_string());
                    warn!(error = %err, "Reading from store instead");
                    // Clearing lets the next read repopulate
                    if let Err(err) = self.cache.delete(LISTING_KEY).await {
                        warn!(error = %err, "Failed to clear corrupt listing");
                    }
                    self.scan().await
                }
            },
            CacheLookup::Miss => {
                debug!("Listing cache miss, reading from store");
                // Taken before the scan so a write landing mid-scan voids the populate
                let generation = self.cache.generation(LISTING_KEY).await;
                let recipes = self.scan().await?;
                match generation {
                    Ok(generation) => self.populate(&recipes, generation).await,
                    Err(err) => warn!(error = %err, "Cache generation unavailable, not caching"),
                }
                Ok(recipes)
            }
            CacheLookup::Fault(err) => {
                warn!(error = %err, "Cache unavailable, reading from store without caching");
                self.scan().await
            }
        }
    }

    // == Update ==
    /// Replaces the mutable fields of a recipe.
    ///
    /// An id that matches nothing is a successful no-op.
    pub async fn update(&self, auth: &Authorized, id: &str, changes: RecipeChanges) -> Result<()> {
        let id = RecipeId::from_str(id)?;
        if let Some(error_msg) = changes.validate() {
            return Err(ServiceError::Validation(error_msg));
        }

        let matched = self.store.update(&id, &changes).await?;
        if matched == 0 {
            debug!(%id, "Update matched no recipe");
        } else {
            info!(%id, subject = auth.subject(), "Recipe updated");
        }

        if self.policy == InvalidationPolicy::AllWrites {
            self.invalidate().await;
        }
        Ok(())
    }

    // == Delete ==
    /// Removes a recipe permanently.
    ///
    /// An id that matches nothing is a successful no-op.
    pub async fn delete(&self, auth: &Authorized, id: &str) -> Result<()> {
        let id = RecipeId::from_str(id)?;

        let deleted = self.store.delete(&id).await?;
        if deleted == 0 {
            debug!(%id, "Delete matched no recipe");
        } else {
            info!(%id, subject = auth.subject(), "Recipe deleted");
        }

        if self.policy == InvalidationPolicy::AllWrites {
            self.invalidate().await;
        }
        Ok(())
    }

    // == Health ==
    /// Pings both backends.
    pub async fn health(&self) -> HealthResponse {
        let store = match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Store health check failed");
                false
            }
        };
        let cache = match self.cache.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Cache health check failed");
                false
            }
        };
        HealthResponse::new(store, cache)
    }

    async fn scan(&self) -> Result<Vec<Recipe>> {
        let records = self.store.scan().await?;
        let total = records.len();

        // Undecodable records are skipped so one bad document cannot take
        // the whole listing down
        let recipes: Vec<Recipe> = records
            .into_iter()
            .filter_map(|record| match record {
                Ok(recipe) => Some(recipe),
                Err(err) => {
                    warn!(error = %err, "Skipping undecodable recipe");
                    None
                }
            })
            .collect();

        if recipes.len() < total {
            warn!(skipped = total - recipes.len(), "Listing degraded");
        }
        Ok(recipes)
    }

    async fn populate(&self, recipes: &[Recipe], generation: u64) {
        let payload = match serde_json::to_string(recipes) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "Failed to serialize listing for cache");
                return;
            }
        };
        match self.cache.set(LISTING_KEY, payload, generation).await {
            Ok(true) => {}
            Ok(false) => debug!(generation, "Listing invalidated during scan, not caching"),
            Err(err) => warn!(error = %err, "Failed to populate listing cache"),
        }
    }

    async fn invalidate(&self) {
        debug!("Invalidating listing cache");
        if let Err(err) = self.cache.delete(LISTING_KEY).await {
            warn!(error = %err, "Listing cache invalidation failed; listing may be stale");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStats, MemoryCache};
    use crate::error::{AuthError, StoreError};
    use crate::store::{MemoryStore, ScanResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Store whose first scan parks after taking its snapshot until released.
    #[derive(Default)]
    struct PausingStore {
        inner: MemoryStore,
        paused: AtomicBool,
        snapshot_taken: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RecipeStore for PausingStore {
        async fn insert(&self, recipe: &Recipe) -> std::result::Result<(), StoreError> {
            self.inner.insert(recipe).await
        }

        async fn update(
            &self,
            id: &RecipeId,
            changes: &RecipeChanges,
        ) -> std::result::Result<u64, StoreError> {
            self.inner.update(id, changes).await
        }

        async fn delete(&self, id: &RecipeId) -> std::result::Result<u64, StoreError> {
            self.inner.delete(id).await
        }

        async fn scan(&self) -> ScanResult {
            let snapshot = self.inner.scan().await;
            if !self.paused.swap(true, Ordering::SeqCst) {
                self.snapshot_taken.notify_one();
                self.release.notified().await;
            }
            snapshot
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        cache: Arc<MemoryCache>,
        service: RecipeService,
    }

    fn harness(policy: InvalidationPolicy) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let service = RecipeService::new(store.clone(), cache.clone(), policy);
        Harness {
            store,
            cache,
            service,
        }
    }

    fn admin() -> Authorized {
        Authorized::new("admin")
    }

    fn draft(name: &str, tags: &[&str]) -> NewRecipe {
        NewRecipe {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ingredients: vec![],
            instructions: vec![],
        }
    }

    fn changes(name: &str) -> RecipeChanges {
        RecipeChanges {
            name: name.to_string(),
            tags: vec!["updated".to_string()],
            ingredients: vec![],
            instructions: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_then_list_includes_recipe() {
        let h = harness(InvalidationPolicy::AllWrites);

        let created = h
            .service
            .create(&admin(), draft("Pasta", &["italian"]))
            .await
            .unwrap();
        let listing = h.service.list().await.unwrap();

        let found = listing.iter().find(|r| r.name == "Pasta").unwrap();
        assert_eq!(found.id, created.id);
        assert!(!found.id.to_string().is_empty());
        assert_eq!(found.tags, vec!["italian".to_string()]);
        assert_eq!(found.published_at, created.published_at);
    }

    #[tokio::test]
    async fn test_populated_cache_short_circuits_store() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();

        h.service.list().await.unwrap();
        let scans = h.store.calls().scans;

        h.service.list().await.unwrap();
        h.service.list().await.unwrap();

        assert_eq!(h.store.calls().scans, scans);
        assert_eq!(h.cache.stats().await.hits, 2);
    }

    #[tokio::test]
    async fn test_create_invalidates_listing() {
        let h = harness(InvalidationPolicy::CreateOnly);
        h.service.list().await.unwrap();
        assert!(h.cache.peek(LISTING_KEY).await.is_some());

        h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        assert!(h.cache.peek(LISTING_KEY).await.is_none());

        let before = h.store.calls().scans;
        h.service.list().await.unwrap();
        h.service.list().await.unwrap();
        assert_eq!(h.store.calls().scans, before + 1);
    }

    #[tokio::test]
    async fn test_create_validation_touches_nothing() {
        let h = harness(InvalidationPolicy::AllWrites);

        let result = h.service.create(&admin(), draft("  ", &[])).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(h.store.calls().total(), 0);
        assert_eq!(h.cache.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_create_store_failure_leaves_cache() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.list().await.unwrap();
        h.store.set_failing(true);

        let result = h.service.create(&admin(), draft("Pasta", &[])).await;

        assert!(matches!(result, Err(ServiceError::Store(_))));
        assert!(h.cache.peek(LISTING_KEY).await.is_some());
        assert_eq!(h.cache.stats().await.deletes, 0);
    }

    #[tokio::test]
    async fn test_create_succeeds_when_invalidation_fails() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.cache.set_failing(true);

        let created = h.service.create(&admin(), draft("Pasta", &[])).await;

        assert!(created.is_ok());
        assert_eq!(h.store.len().await, 1);
        assert_eq!(h.cache.stats().await.faults, 1);
    }

    #[tokio::test]
    async fn test_list_skips_undecodable_records() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        h.store
            .insert_raw(json!({"id": "legacy", "title": "no name field"}))
            .await;

        let listing = h.service.list().await.unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "Pasta");
    }

    #[tokio::test]
    async fn test_list_cache_fault_falls_back_without_populating() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        h.cache.set_failing(true);

        let listing = h.service.list().await.unwrap();
        assert_eq!(listing.len(), 1);

        h.cache.set_failing(false);
        assert!(h.cache.peek(LISTING_KEY).await.is_none());
        assert_eq!(h.cache.stats().await.sets, 0);
    }

    #[tokio::test]
    async fn test_list_store_failure_on_miss() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.store.set_failing(true);

        let result = h.service.list().await;

        assert!(matches!(result, Err(ServiceError::Store(StoreError::Unavailable(_)))));
        assert!(h.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_corrupt_cache_reads_store_and_clears_slot() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        let generation = h.cache.generation(LISTING_KEY).await.unwrap();
        h.cache
            .set(LISTING_KEY, "{not json".to_string(), generation)
            .await
            .unwrap();

        let listing = h.service.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert!(h.cache.peek(LISTING_KEY).await.is_none());

        // Next read repopulates
        h.service.list().await.unwrap();
        assert!(h.cache.peek(LISTING_KEY).await.is_some());
    }

    #[tokio::test]
    async fn test_cached_listing_roundtrips() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service
            .create(&admin(), draft("Pasta", &["italian", "quick"]))
            .await
            .unwrap();
        h.service.create(&admin(), draft("Curry", &[])).await.unwrap();

        let fresh = h.service.list().await.unwrap();
        let cached = h.service.list().await.unwrap();

        assert_eq!(cached, fresh);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_idempotent() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        let before = h.service.list().await.unwrap();
        let id = RecipeId::generate().to_string();

        h.service.delete(&admin(), &id).await.unwrap();
        h.service.delete(&admin(), &id).await.unwrap();

        assert_eq!(h.service.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_malformed_id_rejected_without_store_calls() {
        let h = harness(InvalidationPolicy::AllWrites);

        let update = h
            .service
            .update(&admin(), "not-a-valid-id", changes("Risotto"))
            .await;
        let delete = h.service.delete(&admin(), "not-a-valid-id").await;

        assert!(matches!(update, Err(ServiceError::Validation(_))));
        assert!(matches!(delete, Err(ServiceError::Validation(_))));
        assert_eq!(h.store.calls().total(), 0);
        assert_eq!(h.cache.stats().await.deletes, 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop_success() {
        let h = harness(InvalidationPolicy::AllWrites);
        let id = RecipeId::generate().to_string();

        h.service
            .update(&admin(), &id, changes("Risotto"))
            .await
            .unwrap();

        assert!(h.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_writes_policy_update_is_visible() {
        let h = harness(InvalidationPolicy::AllWrites);
        let created = h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        h.service.list().await.unwrap();

        h.service
            .update(&admin(), &created.id.to_string(), changes("Risotto"))
            .await
            .unwrap();
        let listing = h.service.list().await.unwrap();

        assert_eq!(listing[0].name, "Risotto");
        assert_eq!(listing[0].published_at, created.published_at);
    }

    #[tokio::test]
    async fn test_all_writes_policy_delete_is_visible() {
        let h = harness(InvalidationPolicy::AllWrites);
        let created = h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        h.service.list().await.unwrap();

        h.service
            .delete(&admin(), &created.id.to_string())
            .await
            .unwrap();

        assert!(h.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_only_policy_leaves_stale_listing() {
        let h = harness(InvalidationPolicy::CreateOnly);
        let created = h.service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        h.service.list().await.unwrap();

        h.service
            .update(&admin(), &created.id.to_string(), changes("Risotto"))
            .await
            .unwrap();
        assert_eq!(h.service.list().await.unwrap()[0].name, "Pasta");

        h.service
            .delete(&admin(), &created.id.to_string())
            .await
            .unwrap();
        assert_eq!(h.service.list().await.unwrap().len(), 1);

        // The next create clears the stale snapshot
        h.service.create(&admin(), draft("Curry", &[])).await.unwrap();
        let listing = h.service.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "Curry");
    }

    #[tokio::test]
    async fn test_update_store_failure_skips_invalidation() {
        let h = harness(InvalidationPolicy::AllWrites);
        h.service.list().await.unwrap();
        h.store.set_failing(true);

        let id = RecipeId::generate().to_string();
        let result = h.service.update(&admin(), &id, changes("Risotto")).await;

        assert!(matches!(result, Err(ServiceError::Store(_))));
        assert!(h.cache.peek(LISTING_KEY).await.is_some());
    }

    #[tokio::test]
    async fn test_scan_overtaken_by_create_is_not_cached() {
        let store = Arc::new(PausingStore::default());
        let cache = Arc::new(MemoryCache::new());
        let service = RecipeService::new(
            store.clone(),
            cache.clone(),
            InvalidationPolicy::CreateOnly,
        );

        let reader = tokio::spawn({
            let service = service.clone();
            async move { service.list().await }
        });
        store.snapshot_taken.notified().await;

        // Acknowledged while the reader still holds the empty snapshot
        let created = service.create(&admin(), draft("Pasta", &[])).await.unwrap();
        store.release.notify_one();

        let overtaken = reader.await.unwrap().unwrap();
        assert!(overtaken.is_empty());
        assert!(cache.peek(LISTING_KEY).await.is_none());
        assert_eq!(cache.stats().await.stale_sets, 1);

        let listing = service.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, created.id);

        // The fresh scan was cached
        assert_eq!(service.list().await.unwrap(), listing);
        assert_eq!(cache.stats().await.sets, 1);
    }

    #[tokio::test]
    async fn test_health_reports_each_backend() {
        let h = harness(InvalidationPolicy::AllWrites);
        assert!(h.service.health().await.is_healthy());

        h.cache.set_failing(true);
        let report = h.service.health().await;
        assert!(report.store);
        assert!(!report.cache);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "create-only".parse::<InvalidationPolicy>(),
            Ok(InvalidationPolicy::CreateOnly)
        );
        assert_eq!(
            "ALL_WRITES".parse::<InvalidationPolicy>(),
            Ok(InvalidationPolicy::AllWrites)
        );
        assert!("sometimes".parse::<InvalidationPolicy>().is_err());
    }

    #[test]
    fn test_auth_error_converts() {
        let err: ServiceError = AuthError::Expired.into();
        assert!(matches!(err, ServiceError::Auth(AuthError::Expired)));
    }
}
