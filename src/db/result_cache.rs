//! Fingerprinted cache of computed pools.
//!
//! The cache is an optimization only. Every store failure turns into a
//! `CacheMiss` on read and a logged no-op on write.

use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::{
    db::{redis::CacheKey, CacheStore},
    models::{CacheEntry, FilterCriteria, PoolEntry},
};

/// Why a lookup produced no pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMiss {
    /// No store configured
    Disabled,
    NotFound,
    /// Store unreachable or erroring
    Unavailable,
    /// Stored payload could not be decoded
    Corrupt,
    /// Entry too small for the limit once exclusions are applied
    Insufficient,
}

impl Display for CacheMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            CacheMiss::Disabled => "disabled",
            CacheMiss::NotFound => "not found",
            CacheMiss::Unavailable => "store unavailable",
            CacheMiss::Corrupt => "corrupt entry",
            CacheMiss::Insufficient => "entry too small",
        };
        write!(f, "{}", reason)
    }
}

#[derive(Clone)]
pub struct ResultCache {
    store: Option<Arc<dyn CacheStore>>,
    ttl_secs: u64,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_secs: u64) -> Self {
        Self {
            store: Some(store),
            ttl_secs,
        }
    }

    /// A cache that always misses and never writes
    pub fn disabled() -> Self {
        Self {
            store: None,
            ttl_secs: 0,
        }
    }

    /// Order-independent hash of media kind and genres
    pub fn fingerprint(criteria: &FilterCriteria) -> String {
        let genres = criteria
            .sorted_genres()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let canonical = format!("{}:{}", criteria.media_kind, genres);
        format!("{:x}", Sha256::digest(canonical.as_bytes()))
    }

    /// Cached pool answering `criteria`, exclusions and limit applied
    pub async fn get(&self, criteria: &FilterCriteria) -> Result<Vec<PoolEntry>, CacheMiss> {
        let store = self.store.as_ref().ok_or(CacheMiss::Disabled)?;
        let fingerprint = Self::fingerprint(criteria);
        let key = CacheKey::FilteredPool(fingerprint.clone()).to_string();

        let raw = match store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(CacheMiss::NotFound),
            Err(e) => {
                tracing::warn!(
                    fingerprint = %fingerprint,
                    error = %e,
                    "Pool cache read failed, treating as miss"
                );
                return Err(CacheMiss::Unavailable);
            }
        };

        let entry: CacheEntry = serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!(fingerprint = %fingerprint, error = %e, "Corrupt pool cache entry");
            CacheMiss::Corrupt
        })?;

        entry.serve(criteria).ok_or(CacheMiss::Insufficient)
    }

    /// Best-effort write of a freshly built pool
    pub async fn put(&self, criteria: &FilterCriteria, pool: &[PoolEntry]) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let fingerprint = Self::fingerprint(criteria);
        let entry = CacheEntry {
            fingerprint: fingerprint.clone(),
            pool: pool.to_vec(),
            limit: criteria.limit,
            created_at: Utc::now(),
            ttl_secs: self.ttl_secs,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Pool cache serialization error");
                return;
            }
        };

        let key = CacheKey::FilteredPool(fingerprint.clone()).to_string();
        if let Err(e) = store.put(&key, json, self.ttl_secs).await {
            tracing::warn!(
                fingerprint = %fingerprint,
                error = %e,
                "Pool cache write failed, continuing without cache"
            );
        }
    }
}
