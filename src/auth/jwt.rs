//! Signed token gate
//!
//! HS256 tokens carried in the `Authorization` header, with or without a
//! `Bearer ` prefix. `jsonwebtoken` verifies the signature; expiry is checked
//! here against an injectable clock so tests stay deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::auth::{AccessGate, Authorized, Claims};
use crate::error::AuthError;

/// Header carrying the token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Clock skew tolerance in seconds
pub const DEFAULT_LEEWAY_SECS: i64 = 30;

// == Clock ==
/// Time source for expiry checks.
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// == JWT Gate ==
/// Gate verifying and issuing signed tokens.
#[derive(Clone)]
pub struct JwtGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
    clock: Arc<dyn Clock>,
}

impl JwtGate {
    /// Creates a gate signing with `secret`; issued tokens live for
    /// `expiration_secs`.
    pub fn new(secret: &str, expiration_secs: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Invalid);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Signs a token for `subject`. Returns the token and its claims.
    pub fn issue(&self, subject: &str) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
        let now = self.clock.now_epoch_secs();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.expiration_secs,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        // Signature only; expiry is checked below against our clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(reason = ?e.kind(), "Rejected token");
            AuthError::Invalid
        })?;

        let claims = data.claims;
        if claims.exp < self.clock.now_epoch_secs() - DEFAULT_LEEWAY_SECS {
            return Err(AuthError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::Invalid);
        }
        Ok(claims)
    }
}

impl AccessGate for JwtGate {
    fn header_name(&self) -> &'static str {
        AUTHORIZATION_HEADER
    }

    fn authorize(&self, credential: Option<&str>) -> Result<Authorized, AuthError> {
        let raw = match credential.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::Missing),
        };
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        let claims = self.verify(token)?;
        Ok(Authorized::new(claims.sub))
    }
}
