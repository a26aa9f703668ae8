use async_trait::async_trait;
use std::time::Duration;

/// Errors a cache backend can report.
///
/// Callers above the accessor never see these; they exist so backends can be
/// logged with a useful distinction between "cannot reach it" and "it
/// answered with an error".
#[derive(Debug, thiserror::Error)]
pub enum CacheStoreError {
    /// The backend could not be reached or the connection dropped mid-call
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// The backend was reachable but the operation failed
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// A key-value store with per-entry expiry.
///
/// Implementations are responsible for never returning an entry past its
/// expiry. Values are opaque bytes; serialization happens above this layer.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the bytes stored under `key`. `None` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheStoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheStoreError>;
}
