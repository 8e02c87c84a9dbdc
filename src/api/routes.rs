//! API Routes
//!
//! Configures the Axum router with all recipes endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_recipe_handler, health_handler, list_recipes_handler, new_recipe_handler,
    sign_in_handler, update_recipe_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /recipes` - List all recipes
/// - `POST /recipes` - Create a recipe (auth)
/// - `PUT /recipes/:id` - Replace a recipe's fields (auth)
/// - `DELETE /recipes/:id` - Delete a recipe (auth)
/// - `POST /signin` - Exchange credentials for a token
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/recipes", get(list_recipes_handler).post(new_recipe_handler))
        .route(
            "/recipes/:id",
            put(update_recipe_handler).delete(delete_recipe_handler),
        )
        .route("/signin", post(sign_in_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
