//! Redis cache backend
//!
//! Uses a `ConnectionManager`, which reconnects on its own and is cheap to
//! clone per call. A nil reply is a miss; any other error is a fault.
//!
//! A key's generation lives next to it under `<key>:generation`. Deletes bump
//! it in a MULTI/EXEC block and sets compare it inside a Lua script, so both
//! checks are atomic on the server.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult, Script};
use tracing::info;

use crate::cache::{CacheLookup, ListingCache};
use crate::error::CacheError;

// Writes ARGV[1] to KEYS[1] only while KEYS[2] still equals ARGV[2]
const SET_IF_GENERATION: &str = r"
local current = redis.call('GET', KEYS[2]) or '0'
if current == ARGV[2] then
    redis.call('SET', KEYS[1], ARGV[1])
    return 1
end
return 0
";

// == Redis Cache ==
/// Cache backend talking to a Redis server.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    set_script: Script,
}

impl RedisCache {
    /// Connects to the server at `url` (e.g. `redis://localhost:6379/0`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        info!("Connected to Redis");
        Ok(Self {
            conn,
            set_script: Script::new(SET_IF_GENERATION),
        })
    }
}

fn generation_key(key: &str) -> String {
    format!("{key}:generation")
}

fn unavailable(err: redis::RedisError) -> CacheError {
    CacheError::Unavailable(err.to_string())
}

#[async_trait]
impl ListingCache for RedisCache {
    async fn get(&self, key: &str) -> CacheLookup {
        let mut conn = self.conn.clone();
        let reply: RedisResult<Option<String>> = conn.get(key).await;
        match reply {
            Ok(Some(value)) => CacheLookup::Hit(value),
            Ok(None) => CacheLookup::Miss,
            Err(err) => CacheLookup::Fault(unavailable(err)),
        }
    }

    async fn generation(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let reply: RedisResult<Option<u64>> = conn.get(generation_key(key)).await;
        reply.map(|generation| generation.unwrap_or(0)).map_err(unavailable)
    }

    async fn set(&self, key: &str, value: String, generation: u64) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let reply: RedisResult<i64> = self
            .set_script
            .key(key)
            .key(generation_key(key))
            .arg(value)
            .arg(generation)
            .invoke_async(&mut conn)
            .await;
        reply.map(|written| written == 1).map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let reply: RedisResult<()> = redis::pipe()
            .atomic()
            .del(key)
            .ignore()
            .incr(generation_key(key), 1)
            .ignore()
            .query_async(&mut conn)
            .await;
        reply.map_err(unavailable)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let reply: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        reply.map(|_| ()).map_err(unavailable)
    }
}
