//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::fmt;

use crate::service::InvalidationPolicy;

/// Which access gate protects mutating routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Shared static secret in the `X-API-KEY` header
    #[default]
    ApiKey,
    /// Signed token in the `Authorization` header
    Jwt,
}

impl AuthMode {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "api-key" | "api_key" | "apikey" => Some(AuthMode::ApiKey),
            "jwt" => Some(AuthMode::Jwt),
            _ => None,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Store and cache targets are optional; without them the in-memory backends
/// are used.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// MongoDB connection string
    pub mongo_uri: Option<String>,
    /// MongoDB database name
    pub mongo_database: String,
    /// Redis connection URL
    pub redis_url: Option<String>,
    /// Access gate selection
    pub auth_mode: AuthMode,
    /// Shared secret for api-key mode
    pub api_key: Option<String>,
    /// Signing key for jwt mode
    pub jwt_secret: Option<String>,
    /// Lifetime of issued tokens in seconds
    pub jwt_expiration_secs: i64,
    /// Account allowed to sign in
    pub admin_username: String,
    /// Password for the sign-in account; sign-in is disabled when unset
    pub admin_password: Option<String>,
    /// Which writes clear the listing cache
    pub invalidation_policy: InvalidationPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `MONGO_URI` - MongoDB connection string (default: in-memory store)
    /// - `MONGO_DATABASE` - MongoDB database (default: "recipes")
    /// - `REDIS_URL` - Redis URL (default: in-memory cache)
    /// - `AUTH_MODE` - `api-key` or `jwt` (default: api-key)
    /// - `X_API_KEY` - shared secret for api-key mode
    /// - `JWT_SECRET` - signing key for jwt mode
    /// - `JWT_EXPIRATION_SECS` - token lifetime (default: 600)
    /// - `ADMIN_USERNAME` / `ADMIN_PASSWORD` - sign-in account (default user: "admin")
    /// - `INVALIDATION_POLICY` - `all-writes` or `create-only` (default: all-writes)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            server_port: non_empty("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            mongo_uri: non_empty("MONGO_URI"),
            mongo_database: non_empty("MONGO_DATABASE").unwrap_or(defaults.mongo_database),
            redis_url: non_empty("REDIS_URL"),
            auth_mode: non_empty("AUTH_MODE")
                .and_then(|v| AuthMode::parse(&v))
                .unwrap_or(defaults.auth_mode),
            api_key: non_empty("X_API_KEY"),
            jwt_secret: non_empty("JWT_SECRET"),
            jwt_expiration_secs: non_empty("JWT_EXPIRATION_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.jwt_expiration_secs),
            admin_username: non_empty("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: non_empty("ADMIN_PASSWORD"),
            invalidation_policy: non_empty("INVALIDATION_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.invalidation_policy),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            mongo_uri: None,
            mongo_database: "recipes".to_string(),
            redis_url: None,
            auth_mode: AuthMode::ApiKey,
            api_key: None,
            jwt_secret: None,
            jwt_expiration_secs: 600,
            admin_username: "admin".to_string(),
            admin_password: None,
            invalidation_policy: InvalidationPolicy::AllWrites,
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("server_port", &self.server_port)
            .field("mongo_uri", &redact(&self.mongo_uri))
            .field("mongo_database", &self.mongo_database)
            .field("redis_url", &redact(&self.redis_url))
            .field("auth_mode", &self.auth_mode)
            .field("api_key", &redact(&self.api_key))
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &redact(&self.admin_password))
            .field("invalidation_policy", &self.invalidation_policy)
            .finish()
    }
}
