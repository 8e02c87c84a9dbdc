//! Response DTOs for the recipes API
//!
//! Defines the structure of outgoing HTTP response bodies. Recipes themselves
//! are serialized directly.

use serde::Serialize;

/// Plain message body, used by PUT /recipes/:id
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Creates a new MessageResponse
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Body returned after a successful update.
    pub fn updated() -> Self {
        Self::new("Recipe has been updated")
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy" or "degraded")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Store reachability
    pub store: bool,
    /// Cache reachability
    pub cache: bool,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn new(store: bool, cache: bool) -> Self {
        let status = if store && cache { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            store,
            cache,
        }
    }

    /// Whether every backend answered.
    pub fn is_healthy(&self) -> bool {
        self.store && self.cache
    }
}

/// Response body for POST /signin
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token: String,
    /// Expiry as RFC 3339
    pub expires: String,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
