use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

use crate::store::{CacheStore, CacheStoreError};

/// Redis-backed [`CacheStore`].
///
/// Holds a [`ConnectionManager`], which multiplexes one connection and
/// reconnects on its own after drops. Commands issued while the connection
/// is down fail immediately; there is no retry at this layer.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis instance at `url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// Fails if the initial connection cannot be established. Callers that
    /// want to run without Redis should fall back to
    /// [`MemoryStore`](crate::MemoryStore) instead.
    pub async fn connect(url: &str) -> Result<Self, CacheStoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheStoreError::Backend(format!("invalid Redis URL: {}", e)))?;
        let manager = ConnectionManager::new(client).await.map_err(classify)?;

        tracing::debug!("Connected to Redis cache");
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(classify)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheStoreError> {
        let mut conn = self.manager.clone();
        // SETEX rejects a zero expiry
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await.map_err(classify)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await.map_err(classify)?;
        Ok(())
    }
}

fn classify(err: redis::RedisError) -> CacheStoreError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
    {
        CacheStoreError::Unavailable(err.to_string())
    } else {
        CacheStoreError::Backend(err.to_string())
    }
}
