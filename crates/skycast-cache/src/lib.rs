//! Best-effort caching for weather lookups.
//!
//! Provides the [`CacheStore`] backend trait with two implementations
//! ([`RedisStore`] for production, [`MemoryStore`] for tests and cache-less
//! runs) and the fail-soft [`CacheAccessor`] that the lookup service talks to.

pub mod accessor;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use accessor::CacheAccessor;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{CacheStore, CacheStoreError};
