//! Recipe resource
//!
//! The stored document and its server-generated identifier.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::NewRecipe;

// == Recipe Id ==
/// Opaque recipe identifier, generated server-side on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecipeId {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ServiceError::validation(format!("Invalid recipe id: {s}")))
    }
}

// == Recipe ==
/// A stored recipe.
///
/// `id` and `published_at` are assigned once on create and never change;
/// the remaining fields are replaced wholesale by an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}

impl Recipe {
    /// Builds a recipe from a create request, stamping identity and time.
    pub fn publish(draft: NewRecipe, id: RecipeId, published_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            tags: draft.tags,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            published_at,
        }
    }
}
