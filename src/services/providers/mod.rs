/// Catalog provider abstraction
///
/// The pipeline only needs two reads from the metadata provider: a paged
/// "discover by media kind" query and the genre list of a media kind. Both go
/// through `CatalogSource` so the pipeline can run against stubs in tests.
use crate::{
    error::AppResult,
    models::{Genre, MediaKind, TmdbDiscoverPage},
};

pub mod tmdb;

pub use tmdb::TmdbSource;

/// Sort orders the pipeline asks the provider for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PopularityDesc,
}

impl SortKey {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
        }
    }
}

/// One discover request, genres already resolved for the target kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub media_kind: MediaKind,
    /// Empty means genre-unfiltered
    pub genre_ids: Vec<u32>,
    pub sort: SortKey,
    /// 1-indexed
    pub page: u32,
}

impl DiscoverQuery {
    /// Comma-joined genre filter; the provider reads commas as AND
    pub fn genres_csv(&self) -> Option<String> {
        if self.genre_ids.is_empty() {
            return None;
        }

        Some(
            self.genre_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Trait for catalog metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of discover results
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<TmdbDiscoverPage>;

    /// Fetch the genre vocabulary of a media kind
    async fn genres(&self, media_kind: MediaKind) -> AppResult<Vec<Genre>>;
}
