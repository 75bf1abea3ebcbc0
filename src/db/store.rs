use crate::error::AppResult;

/// Key-value store with per-key TTL backing the result cache
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Raw value stored under `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores `value` under `key` for `ttl_secs` seconds
    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> AppResult<()>;
}
