pub mod memory;
pub mod redis;
pub mod result_cache;
pub mod store;

use std::sync::Arc;

use crate::config::{CacheBackend, Config};

pub use memory::MemoryStore;
pub use self::redis::{create_redis_client, CacheKey, CacheWriterHandle, RedisStore};
pub use result_cache::{CacheMiss, ResultCache};
#[cfg(test)]
pub use store::MockCacheStore;
pub use store::CacheStore;

/// Builds the result cache for the configured backend
///
/// The Redis backend also returns the writer handle that must be shut down
/// to flush queued writes.
pub fn build_result_cache(
    config: &Config,
) -> anyhow::Result<(ResultCache, Option<CacheWriterHandle>)> {
    match config.cache_backend {
        CacheBackend::Redis => {
            let client = create_redis_client(&config.redis_url)?;
            let (store, handle) = RedisStore::new(client);
            tracing::info!(backend = "redis", "Pool cache configured");
            Ok((
                ResultCache::new(Arc::new(store), config.pool_cache_ttl_secs),
                Some(handle),
            ))
        }
        CacheBackend::Memory => {
            tracing::info!(backend = "memory", "Pool cache configured");
            Ok((
                ResultCache::new(Arc::new(MemoryStore::default()), config.pool_cache_ttl_secs),
                None,
            ))
        }
        CacheBackend::Disabled => {
            tracing::info!("Pool cache disabled");
            Ok((ResultCache::disabled(), None))
        }
    }
}
