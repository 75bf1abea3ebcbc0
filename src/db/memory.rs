use std::time::{Duration, Instant};

use moka::{future::Cache, Expiry};

use crate::{db::CacheStore, error::AppResult};

/// Expires each entry after the TTL it was stored with
struct StoredTtl;

impl Expiry<String, (String, Duration)> for StoredTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(String, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-process cache store for single-node deployments and tests
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, (String, Duration)>,
}

impl MemoryStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(StoredTtl)
            .build();

        Self { cache }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|(value, _)| value))
    }

    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), (value, Duration::from_secs(ttl_secs)))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::default();
        store.put("pool:abc", "[]".to_string(), 60).await.unwrap();
        assert_eq!(store.get("pool:abc").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = MemoryStore::default();
        assert_eq!(store.get("pool:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_ttl() {
        let store = MemoryStore::default();
        store.put("pool:short", "x".to_string(), 0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("pool:short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::default();
        store.put("pool:k", "first".to_string(), 60).await.unwrap();
        store.put("pool:k", "second".to_string(), 60).await.unwrap();
        assert_eq!(store.get("pool:k").await.unwrap().as_deref(), Some("second"));
    }
}
