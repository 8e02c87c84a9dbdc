//! API Module
//!
//! HTTP handlers and routing for the recipes REST API.
//!
//! # Endpoints
//! - `GET /recipes` - List all recipes
//! - `POST /recipes` - Create a recipe (auth)
//! - `PUT /recipes/:id` - Replace a recipe's fields (auth)
//! - `DELETE /recipes/:id` - Delete a recipe (auth)
//! - `POST /signin` - Exchange credentials for a token (jwt mode)
//! - `GET /health` - Health check endpoint

pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::RequireAuth;
pub use handlers::*;
pub use routes::create_router;
