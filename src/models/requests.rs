//! Request DTOs for the recipes API
//!
//! Defines the structure of incoming HTTP request bodies. Unknown fields,
//! including any client-supplied `id` or `publishedAt`, are ignored.

use serde::Deserialize;

/// Maximum allowed recipe name length in bytes
pub const MAX_NAME_LENGTH: usize = 256;

/// Request body for creating a recipe (POST /recipes)
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl NewRecipe {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name(&self.name)
    }
}

/// Request body for replacing a recipe's mutable fields (PUT /recipes/:id)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipeChanges {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl RecipeChanges {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Recipe name cannot be empty".to_string());
    }
    if name.len() > MAX_NAME_LENGTH {
        return Some(format!(
            "Recipe name exceeds maximum length of {} bytes",
            MAX_NAME_LENGTH
        ));
    }
    None
}

/// Request body for POST /signin
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}
