//! Access Gate Module
//!
//! Decides whether a caller may mutate recipes. The service never sees the
//! credential itself; it only accepts an [`Authorized`] value, which can only
//! be produced by a gate that said yes.

mod api_key;
mod jwt;
mod sign_in;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

pub use api_key::ApiKeyGate;
pub use jwt::{Clock, FixedClock, JwtGate, SystemClock};
pub use sign_in::SignIn;

// == Claims ==
/// Typed token claims. Subject and expiry are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

// == Authorized ==
/// Proof that a gate allowed the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    subject: String,
}

impl Authorized {
    pub(crate) fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Who was authorized.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

// == Access Gate ==
/// Authorization boundary for mutating operations.
///
/// Implementations must fail closed: a missing, empty or unverifiable
/// credential is always denied.
pub trait AccessGate: Send + Sync {
    /// Request header carrying the credential.
    fn header_name(&self) -> &'static str;

    /// Checks a credential taken from [`header_name`](Self::header_name).
    fn authorize(&self, credential: Option<&str>) -> Result<Authorized, AuthError>;
}
