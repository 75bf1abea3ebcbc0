use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Upper bound on requested genres per pool
pub const MAX_GENRES: usize = 3;

/// Pool size used when the caller does not ask for one
pub const DEFAULT_LIMIT: usize = 30;

/// Content universe an item belongs to; each has its own genre vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }

    /// Path segment the catalog provider uses for this kind
    pub fn provider_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "series" | "tv" => Ok(MediaKind::Series),
            other => Err(AppError::InvalidCriteria(format!(
                "Unknown media kind '{}', expected 'movie' or 'series'",
                other
            ))),
        }
    }
}

/// What a caller wants in a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub media_kind: MediaKind,
    /// Requested genres in caller order
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub exclude_ids: HashSet<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl FilterCriteria {
    /// Creates criteria with the default limit, collapsing duplicate genres
    pub fn new(media_kind: MediaKind, genre_ids: Vec<u32>) -> Self {
        let mut criteria = Self {
            media_kind,
            genre_ids,
            exclude_ids: HashSet::new(),
            limit: DEFAULT_LIMIT,
        };
        criteria.genre_ids = criteria.distinct_genres();
        criteria
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_excluded<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Requested genres with duplicates removed, first occurrence wins
    pub fn distinct_genres(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        self.genre_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Requested genres in ascending order, the order-independent form
    pub fn sorted_genres(&self) -> Vec<u32> {
        self.genre_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_excluded(&self, external_id: &str) -> bool {
        self.exclude_ids.contains(external_id)
    }

    /// Checks genre count and limit bounds
    pub fn validate(&self, max_limit: usize) -> AppResult<()> {
        let genres = self.distinct_genres();

        if genres.is_empty() {
            return Err(AppError::InvalidCriteria(
                "At least one genre must be requested".to_string(),
            ));
        }

        if genres.len() > MAX_GENRES {
            return Err(AppError::InvalidCriteria(format!(
                "At most {} genres may be requested, got {}",
                MAX_GENRES,
                genres.len()
            )));
        }

        if self.limit == 0 {
            return Err(AppError::InvalidCriteria(
                "Limit must be greater than zero".to_string(),
            ));
        }

        if self.limit > max_limit {
            return Err(AppError::InvalidCriteria(format!(
                "Limit {} exceeds the maximum of {}",
                self.limit, max_limit
            )));
        }

        Ok(())
    }
}
