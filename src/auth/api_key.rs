//! Shared static secret gate
//!
//! Compares the `X-API-KEY` header against a configured key.

use subtle::ConstantTimeEq;

use crate::auth::{AccessGate, Authorized};
use crate::error::AuthError;

/// Header carrying the shared key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Gate accepting a single shared API key.
#[derive(Clone)]
pub struct ApiKeyGate {
    key: String,
}

impl ApiKeyGate {
    /// Creates a gate for `key`. An empty key is refused, since it would
    /// match an empty header.
    pub fn new(key: impl Into<String>) -> Result<Self, AuthError> {
        let key = key.into();
        if key.is_empty() {
            return Err(AuthError::Invalid);
        }
        Ok(Self { key })
    }
}

impl std::fmt::Debug for ApiKeyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKeyGate([REDACTED, {} chars])", self.key.len())
    }
}

impl AccessGate for ApiKeyGate {
    fn header_name(&self) -> &'static str {
        API_KEY_HEADER
    }

    fn authorize(&self, credential: Option<&str>) -> Result<Authorized, AuthError> {
        let presented = match credential {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::Missing),
        };

        if bool::from(presented.as_bytes().ct_eq(self.key.as_bytes())) {
            Ok(Authorized::new("api-key"))
        } else {
            Err(AuthError::Invalid)
        }
    }
}
