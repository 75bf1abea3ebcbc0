//! Translation between the movie and series genre vocabularies.
//!
//! The two catalogs use different genre ids, and several movie genres have
//! next to no series content. Requests for those are served with the closest
//! genre that actually yields results in the target kind.

use std::collections::{HashMap, HashSet};

use crate::models::{Genre, MediaKind};

const MOVIE_GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

const SERIES_GENRES: &[(u32, &str)] = &[
    (10759, "Action & Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (10762, "Kids"),
    (9648, "Mystery"),
    (10763, "News"),
    (10764, "Reality"),
    (10765, "Sci-Fi & Fantasy"),
    (10766, "Soap"),
    (10767, "Talk"),
    (10768, "War & Politics"),
    (37, "Western"),
];

/// Movie genre → series genre used when querying series
const SERIES_EQUIVALENTS: &[(u32, u32)] = &[
    (28, 10759),
    (12, 10759),
    (14, 10765),
    (878, 10765),
    (10752, 10768),
    (36, 10768),
    (27, 9648),
    (53, 18),
    (10749, 18),
    (10402, 18),
    (10770, 18),
];

/// Series genre → movie genre used when querying movies
const MOVIE_EQUIVALENTS: &[(u32, u32)] = &[
    (10759, 28),
    (10765, 878),
    (10768, 10752),
    (10762, 10751),
    (10763, 99),
    (10764, 99),
    (10767, 99),
    (10766, 18),
];

/// Builds the default `(genre, target kind) → genre` table
pub fn default_mapping() -> HashMap<(u32, MediaKind), u32> {
    let series = SERIES_EQUIVALENTS
        .iter()
        .map(|&(from, to)| ((from, MediaKind::Series), to));
    let movies = MOVIE_EQUIVALENTS
        .iter()
        .map(|&(from, to)| ((from, MediaKind::Movie), to));
    series.chain(movies).collect()
}

/// Static genre translation table, built once and shared read-only
#[derive(Debug, Clone)]
pub struct GenreTaxonomyMapper {
    table: HashMap<(u32, MediaKind), u32>,
}

impl Default for GenreTaxonomyMapper {
    fn default() -> Self {
        Self::new(default_mapping())
    }
}

impl GenreTaxonomyMapper {
    pub fn new(table: HashMap<(u32, MediaKind), u32>) -> Self {
        Self { table }
    }

    /// Genre id to query when `genre_id` is requested for `media_kind`.
    /// Unmapped genres pass through unchanged.
    pub fn resolve(&self, genre_id: u32, media_kind: MediaKind) -> u32 {
        self.table
            .get(&(genre_id, media_kind))
            .copied()
            .unwrap_or(genre_id)
    }

    /// Resolves every id, keeping the first occurrence of each result
    pub fn resolve_all(&self, genre_ids: &[u32], media_kind: MediaKind) -> Vec<u32> {
        let mut seen = HashSet::new();
        genre_ids
            .iter()
            .map(|id| self.resolve(*id, media_kind))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Display name from the static vocabulary of `media_kind`
    pub fn genre_name(&self, genre_id: u32, media_kind: MediaKind) -> Option<&'static str> {
        vocabulary(media_kind)
            .iter()
            .find(|(id, _)| *id == genre_id)
            .map(|(_, name)| *name)
    }

    /// Static vocabulary of `media_kind`, used when the provider list is unavailable
    pub fn known_genres(&self, media_kind: MediaKind) -> Vec<Genre> {
        vocabulary(media_kind)
            .iter()
            .map(|&(id, name)| Genre {
                id,
                name: name.to_string(),
            })
            .collect()
    }
}

fn vocabulary(media_kind: MediaKind) -> &'static [(u32, &'static str)] {
    match media_kind {
        MediaKind::Movie => MOVIE_GENRES,
        MediaKind::Series => SERIES_GENRES,
    }
}
