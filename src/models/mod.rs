//! Domain types and request/response models for the recipes API
//!
//! `recipe` holds the stored resource; `requests` and `responses` define the
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod recipe;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use recipe::{Recipe, RecipeId};
pub use requests::{NewRecipe, RecipeChanges, SignInRequest};
pub use responses::{ErrorResponse, HealthResponse, MessageResponse, TokenResponse};
