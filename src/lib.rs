//! Recipes API - A recipe service with a read-through listing cache
//!
//! Serves the recipe listing from a cache slot in front of the document
//! store, invalidates it on writes, and guards writes behind an access gate.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use service::{InvalidationPolicy, RecipeService};
