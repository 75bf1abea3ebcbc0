use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

use super::{CatalogItem, FilterCriteria, MediaKind};

/// Matching strategy that selected an entry, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityTier {
    /// Carries every requested genre
    Exact = 1,
    /// Carries some, but not all, requested genres
    Partial = 2,
    /// Popular fallback, genres unchecked
    Popular = 3,
}

impl PriorityTier {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for PriorityTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriorityTier::Exact),
            2 => Ok(PriorityTier::Partial),
            3 => Ok(PriorityTier::Popular),
            other => Err(format!("invalid priority tier {}", other)),
        }
    }
}

impl Serialize for PriorityTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.rank())
    }
}

impl<'de> Deserialize<'de> for PriorityTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        PriorityTier::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// One selected item of a pool, denormalized for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub external_id: String,
    pub media_kind: MediaKind,
    pub title: String,
    pub overview: String,
    pub genre_ids: BTreeSet<u32>,
    pub original_language: String,
    pub vote_average: f64,
    pub popularity: f64,
    pub release_date: Option<String>,
    pub poster_path: String,
    pub poster_url: String,
    pub priority_tier: PriorityTier,
    pub added_at: DateTime<Utc>,
}

impl PoolEntry {
    pub fn from_item(item: CatalogItem, priority_tier: PriorityTier) -> Self {
        Self {
            external_id: item.external_id,
            media_kind: item.media_kind,
            title: item.title,
            overview: item.overview,
            genre_ids: item.genre_ids,
            original_language: item.original_language,
            vote_average: item.vote_average,
            popularity: item.popularity,
            release_date: item.release_date,
            poster_path: item.poster_path,
            poster_url: item.poster_url,
            priority_tier,
            added_at: Utc::now(),
        }
    }
}

/// Per-tier entry counts of a pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub exact: usize,
    pub partial: usize,
    pub popular: usize,
}

impl TierCounts {
    pub fn of(pool: &[PoolEntry]) -> Self {
        pool.iter().fold(Self::default(), |mut counts, entry| {
            match entry.priority_tier {
                PriorityTier::Exact => counts.exact += 1,
                PriorityTier::Partial => counts.partial += 1,
                PriorityTier::Popular => counts.popular += 1,
            }
            counts
        })
    }
}

/// A computed pool as stored in the result cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub pool: Vec<PoolEntry>,
    /// Limit the pool was built for
    pub limit: usize,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl CacheEntry {
    /// Answers `criteria` from this entry, or `None` when what is left after
    /// exclusions falls short of the limit and the provider may have more.
    pub fn serve(&self, criteria: &FilterCriteria) -> Option<Vec<PoolEntry>> {
        let exhaustive = self.pool.len() < self.limit;
        let pool: Vec<PoolEntry> = self
            .pool
            .iter()
            .filter(|entry| !criteria.is_excluded(&entry.external_id))
            .take(criteria.limit)
            .cloned()
            .collect();

        if pool.len() < criteria.limit && !exhaustive {
            return None;
        }
        Some(pool)
    }
}
