pub mod cache;

pub use cache::create_redis_client;
pub use cache::CacheKey;
pub use cache::CacheWriterHandle;
pub use cache::RedisStore;
