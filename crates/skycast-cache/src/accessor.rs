use std::sync::Arc;
use std::time::Duration;

use crate::store::CacheStore;

/// Fail-soft facade over a [`CacheStore`].
///
/// Weather lookups must keep working when the cache backend is down, so
/// no error crosses this boundary: failed reads report a miss, failed
/// writes and deletes are dropped. Each call is a single attempt.
#[derive(Clone)]
pub struct CacheAccessor {
    store: Arc<dyn CacheStore>,
}

impl CacheAccessor {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Read `key`. Backend failures are logged and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Cache read for {} failed, treating as miss: {}", key, e);
                None
            }
        }
    }

    /// Best-effort write. Failures are logged and dropped.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) {
        if let Err(e) = self.store.set(key, value, ttl).await {
            tracing::warn!("Cache write for {} failed, continuing uncached: {}", key, e);
        }
    }

    /// Best-effort delete, used to evict entries that no longer parse.
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!("Cache delete for {} failed: {}", key, e);
        }
    }
}
