use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::store::{CacheStore, CacheStoreError};

struct StoredEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

type Clock = Box<dyn Fn() -> Instant + Send + Sync>;

/// In-process [`CacheStore`] used in tests and cache-less runs.
///
/// Entries carry an absolute deadline; an entry is served strictly before
/// its deadline and dropped on the first read at or past it. The clock is
/// injectable so expiry boundaries can be tested without sleeping.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
    now: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            now: Box::new(Instant::now),
        }
    }

    #[cfg(test)]
    fn with_clock(now: impl Fn() -> Instant + Send + Sync + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            now: Box::new(now),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let mut entries = self.entries.write();
        let expired = match entries.get(key) {
            Some(entry) => {
                if (self.now)() < entry.expires_at {
                    return Ok(Some(entry.value.clone()));
                }
                true
            }
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheStoreError> {
        let entry = StoredEntry {
            value: value.to_vec(),
            expires_at: (self.now)() + ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
