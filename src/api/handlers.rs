//! API Handlers
//!
//! HTTP request handlers for each recipes endpoint, and the shared state
//! they run against.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::api::RequireAuth;
use crate::auth::{AccessGate, ApiKeyGate, JwtGate, SignIn};
use crate::cache::{ListingCache, MemoryCache};
use crate::config::{AuthMode, Config};
use crate::error::{Result, ServiceError};
use crate::models::{
    HealthResponse, MessageResponse, NewRecipe, Recipe, RecipeChanges, SignInRequest,
    TokenResponse,
};
use crate::service::RecipeService;
use crate::store::{MemoryStore, RecipeStore};

/// Application state shared across all handlers.
///
/// Built once at startup and never mutated; all recipe state lives in the
/// store and cache behind the service.
#[derive(Clone)]
pub struct AppState {
    /// Cache-coherent recipe operations
    pub service: Arc<RecipeService>,
    /// Gate guarding mutating routes
    pub gate: Arc<dyn AccessGate>,
    /// Token issuance, present only in jwt mode with an account configured
    pub sign_in: Option<Arc<SignIn>>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(service: RecipeService, gate: Arc<dyn AccessGate>) -> Self {
        Self {
            service: Arc::new(service),
            gate,
            sign_in: None,
        }
    }

    /// Enables POST /signin.
    pub fn with_sign_in(mut self, sign_in: SignIn) -> Self {
        self.sign_in = Some(Arc::new(sign_in));
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Connects the configured store and cache, and refuses to start
    /// without secret material for the selected gate.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = connect_store(config).await?;
        let cache = connect_cache(config).await?;
        let service = RecipeService::new(store, cache, config.invalidation_policy);

        match config.auth_mode {
            AuthMode::ApiKey => {
                let key = config
                    .api_key
                    .as_deref()
                    .context("X_API_KEY must be set when AUTH_MODE=api-key")?;
                let gate = ApiKeyGate::new(key).context("invalid X_API_KEY")?;
                Ok(Self::new(service, Arc::new(gate)))
            }
            AuthMode::Jwt => {
                let secret = config
                    .jwt_secret
                    .as_deref()
                    .context("JWT_SECRET must be set when AUTH_MODE=jwt")?;
                let gate = JwtGate::new(secret, config.jwt_expiration_secs)
                    .context("invalid JWT_SECRET")?;
                let state = Self::new(service, Arc::new(gate.clone()));

                Ok(match &config.admin_password {
                    Some(password) => state.with_sign_in(SignIn::new(
                        gate,
                        config.admin_username.clone(),
                        password.clone(),
                    )),
                    None => state,
                })
            }
        }
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn RecipeStore>> {
    match &config.mongo_uri {
        None => {
            info!("No MONGO_URI set, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "mongodb")]
        Some(uri) => {
            let store = crate::store::MongoStore::connect(uri, &config.mongo_database)
                .await
                .context("failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        Some(_) => anyhow::bail!("MONGO_URI is set but the `mongodb` feature is not enabled"),
    }
}

async fn connect_cache(config: &Config) -> anyhow::Result<Arc<dyn ListingCache>> {
    match &config.redis_url {
        None => {
            info!("No REDIS_URL set, using in-memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
        #[cfg(feature = "redis")]
        Some(url) => {
            let cache = crate::cache::RedisCache::connect(url)
                .await
                .context("failed to connect to Redis")?;
            Ok(Arc::new(cache))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => anyhow::bail!("REDIS_URL is set but the `redis` feature is not enabled"),
    }
}

/// Handler for GET /recipes
pub async fn list_recipes_handler(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>> {
    let recipes = state.service.list().await?;
    Ok(Json(recipes))
}

/// Handler for POST /recipes
pub async fn new_recipe_handler(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    payload: std::result::Result<Json<NewRecipe>, JsonRejection>,
) -> Result<Json<Recipe>> {
    let Json(draft) = payload.map_err(|e| ServiceError::Validation(e.body_text()))?;
    let recipe = state.service.create(&auth, draft).await?;
    Ok(Json(recipe))
}

/// Handler for PUT /recipes/:id
pub async fn update_recipe_handler(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
    payload: std::result::Result<Json<RecipeChanges>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(changes) = payload.map_err(|e| ServiceError::Validation(e.body_text()))?;
    state.service.update(&auth, &id, changes).await?;
    Ok(Json(MessageResponse::updated()))
}

/// Handler for DELETE /recipes/:id
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service.delete(&auth, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /signin
pub async fn sign_in_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let sign_in = state
        .sign_in
        .as_ref()
        .ok_or_else(|| ServiceError::NotFound("Sign-in is not enabled".to_string()))?;
    let Json(request) = payload.map_err(|e| ServiceError::Validation(e.body_text()))?;
    Ok(Json(sign_in.sign_in(&request)?))
}

/// Handler for GET /health
///
/// Returns 503 when either backend fails its ping.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = state.service.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
