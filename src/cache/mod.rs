//! Price snapshot cache module
//!
//! Keeps the last known reading per vendor and diffs new readings against it.
//! Storage is pluggable through [`CacheBackend`]:
//! - `FileBackend`: a single JSON document on local disk
//! - `MemoryBackend`: a process-local map
//! - `RedisBackend`: a Redis server shared between processes

mod file;
mod memory;
mod remote;
mod store;
mod types;

pub use file::{FileBackend, DEFAULT_CACHE_FILE};
pub use memory::MemoryBackend;
pub use remote::{connection_info, RedisBackend};
pub use store::{PriceCache, DEFAULT_KEY_PREFIX};
pub use types::{CacheEntry, CacheError, ChangeReport};

use crate::config::{CacheBackendKind, CacheConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// Key-value storage consumed by the price cache
///
/// Values are serialized cache entries. Implementations surface I/O failures
/// as [`CacheError::StorageUnavailable`] and never retry internally.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read the value stored under `key`
    async fn read(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Store `value` under `key`, replacing any previous value
    async fn write(&self, key: &str, value: String) -> Result<(), CacheError>;
    /// Persist anything still buffered
    async fn flush(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Open the configured backend and wrap it in a [`PriceCache`]
///
/// An unreachable Redis server falls back to the cache file.
pub async fn open_cache(config: &CacheConfig) -> Result<PriceCache, CacheError> {
    let backend: Arc<dyn CacheBackend> = match config.backend {
        CacheBackendKind::File => Arc::new(FileBackend::open(&config.path).await?),
        CacheBackendKind::Memory => Arc::new(MemoryBackend::new()),
        CacheBackendKind::Redis => match RedisBackend::connect(&config.redis).await {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = ?config.path,
                    "Redis unavailable, using cache file"
                );
                Arc::new(FileBackend::open(&config.path).await?)
            }
        },
    };
    Ok(PriceCache::with_key_prefix(backend, config.key_prefix.clone()))
}
