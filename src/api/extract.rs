//! Request extractors
//!
//! `RequireAuth` runs the configured access gate on the request headers. It
//! is listed before any body extractor, so a denied request is rejected
//! before its body is read and before the service is reached.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::api::AppState;
use crate::auth::Authorized;
use crate::error::{AuthError, ServiceError};

/// Extractor yielding the gate's grant for the current request.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Authorized);

#[async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let decision = match parts.headers.get(state.gate.header_name()) {
            None => state.gate.authorize(None),
            Some(value) => match value.to_str() {
                Ok(credential) => state.gate.authorize(Some(credential)),
                Err(_) => Err(AuthError::Invalid),
            },
        };

        decision.map(RequireAuth).map_err(|err| {
            warn!(method = %parts.method, path = %parts.uri.path(), reason = %err, "Request denied");
            ServiceError::Auth(err)
        })
    }
}
