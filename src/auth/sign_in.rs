//! Token issuance for a configured account.

use chrono::{TimeZone, Utc};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::auth::JwtGate;
use crate::error::{AuthError, Result, ServiceError};
use crate::models::{SignInRequest, TokenResponse};

/// Exchanges the configured account's credentials for a signed token.
#[derive(Clone)]
pub struct SignIn {
    issuer: JwtGate,
    username: String,
    password: String,
}

impl SignIn {
    pub fn new(issuer: JwtGate, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            issuer,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks the credentials and issues a token.
    pub fn sign_in(&self, request: &SignInRequest) -> Result<TokenResponse> {
        let user_ok = request.username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = request.password.as_bytes().ct_eq(self.password.as_bytes());
        if !bool::from(user_ok & pass_ok) {
            warn!(username = %request.username, "Sign-in rejected");
            return Err(AuthError::Invalid.into());
        }

        let (token, claims) = self
            .issuer
            .issue(&request.username)
            .map_err(|e| ServiceError::Internal(format!("failed to sign token: {e}")))?;
        let expires = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        info!(subject = %claims.sub, "Token issued");
        Ok(TokenResponse { token, expires })
    }
}
