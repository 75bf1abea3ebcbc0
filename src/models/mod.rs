use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod criteria;
pub mod pool;

pub use criteria::{FilterCriteria, MediaKind, DEFAULT_LIMIT, MAX_GENRES};
pub use pool::{CacheEntry, PoolEntry, PriorityTier, TierCounts};

/// A genre as listed for one media kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Catalog item that passed the quality gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
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
}

impl CatalogItem {
    /// Number of `genres` this item carries
    pub fn matched_genres(&self, genres: &[u32]) -> usize {
        genres
            .iter()
            .filter(|genre| self.genre_ids.contains(genre))
            .count()
    }

    pub fn contains_all(&self, genres: &[u32]) -> bool {
        genres.iter().all(|genre| self.genre_ids.contains(genre))
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of GET /discover/{movie|tv}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbDiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<TmdbItem>,
}

/// Raw discover result; movies carry `title`/`release_date`, shows
/// `name`/`first_air_date`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl TmdbItem {
    /// Media kind the item itself claims to be
    pub fn media_kind(&self) -> Option<MediaKind> {
        if let Some(media_type) = self.media_type.as_deref() {
            return match media_type {
                "movie" => Some(MediaKind::Movie),
                "tv" => Some(MediaKind::Series),
                _ => None,
            };
        }

        match (&self.title, &self.name) {
            (Some(_), None) => Some(MediaKind::Movie),
            (None, Some(_)) => Some(MediaKind::Series),
            _ if self.release_date.is_some() => Some(MediaKind::Movie),
            _ if self.first_air_date.is_some() => Some(MediaKind::Series),
            _ => None,
        }
    }

    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn air_date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// GET /genre/{movie|tv}/list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}
