//! Error types for the recipes service
//!
//! Provides unified error handling using thiserror. Backend errors are kept
//! separate so the service can apply a distinct policy to each failure class.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Failure talking to the backing document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection or I/O failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the operation
    #[error("store rejected operation: {0}")]
    Rejected(String),

    /// A value could not be encoded for storage
    #[error("failed to encode document: {0}")]
    Encode(String),
}

// == Record Error ==
/// A single stored document that could not be decoded into a recipe.
#[derive(Error, Debug)]
#[error("undecodable record {id}: {reason}")]
pub struct RecordError {
    /// Raw identifier of the document, or `<unknown>`
    pub id: String,
    /// Decoder message
    pub reason: String,
}

impl RecordError {
    /// Creates a new RecordError
    pub fn new(id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

// == Cache Error ==
/// Failure talking to the cache. A missing key is not an error.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Connection or I/O failure
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// Cached payload could not be decoded or encoded
    #[error("corrupt cache payload: {0}")]
    Corrupt(String),
}

// == Auth Error ==
/// Reasons the access gate denies a credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential presented
    #[error("credential not provided")]
    Missing,

    /// Credential is malformed, wrongly signed or does not match
    #[error("credential invalid")]
    Invalid,

    /// Credential was valid but has expired
    #[error("credential expired")]
    Expired,
}

// == Service Error ==
/// Error returned by recipe service operations and HTTP handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed input; never reaches the store or the cache
    #[error("{0}")]
    Validation(String),

    /// Credential missing or invalid; raised before any mutation
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Endpoint disabled by configuration
    #[error("{0}")]
    NotFound(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Store(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the recipes service.
pub type Result<T> = std::result::Result<T, ServiceError>;
