#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use genre_pool::{
    db::{CacheStore, ResultCache},
    error::{AppError, AppResult},
    models::{FilterCriteria, Genre, MediaKind, PoolEntry, PriorityTier, TmdbDiscoverPage, TmdbItem},
    services::{
        CatalogSettings, CatalogSource, ContentFilterService, DiscoverQuery, GenreTaxonomyMapper,
        PoolSettings, QualityGate, RetryPolicy,
    },
};

pub const PAGE_SIZE: usize = 20;
pub const LANGUAGES: [&str; 3] = ["en", "es", "fr"];

/// Provider stub applying AND genre filtering over a fixed catalog
pub struct StubSource {
    items: Vec<TmdbItem>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new(items: Vec<TmdbItem>) -> Arc<Self> {
        Arc::new(Self {
            items,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogSource for StubSource {
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<TmdbDiscoverPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let matching: Vec<&TmdbItem> = self
            .items
            .iter()
            .filter(|item| query.genre_ids.iter().all(|g| item.genre_ids.contains(g)))
            .collect();

        let total_pages = matching.len().div_ceil(PAGE_SIZE).max(1) as u32;
        let start = (query.page.max(1) as usize - 1) * PAGE_SIZE;
        let results = matching
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        Ok(TmdbDiscoverPage {
            page: query.page,
            total_pages,
            results,
        })
    }

    async fn genres(&self, _media_kind: MediaKind) -> AppResult<Vec<Genre>> {
        Ok(vec![
            Genre {
                id: 35,
                name: "Comedy".to_string(),
            },
            Genre {
                id: 16,
                name: "Animation".to_string(),
            },
        ])
    }
}

/// Provider that is always down
#[derive(Default)]
pub struct DownSource {
    calls: AtomicUsize,
}

impl DownSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogSource for DownSource {
    async fn discover(&self, _query: &DiscoverQuery) -> AppResult<TmdbDiscoverPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::ProviderUnavailable("503 Service Unavailable".to_string()))
    }

    async fn genres(&self, _media_kind: MediaKind) -> AppResult<Vec<Genre>> {
        Err(AppError::ProviderUnavailable("503 Service Unavailable".to_string()))
    }
}

/// Provider that fails its first `failures` discover calls, then serves
/// `catalog` like `StubSource`
pub struct FlakySource {
    catalog: Arc<StubSource>,
    failures: usize,
    calls: AtomicUsize,
}

impl FlakySource {
    pub fn new(items: Vec<TmdbItem>, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            catalog: StubSource::new(items),
            failures,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogSource for FlakySource {
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<TmdbDiscoverPage> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(AppError::ProviderUnavailable("503 Service Unavailable".to_string()));
        }
        self.catalog.discover(query).await
    }

    async fn genres(&self, media_kind: MediaKind) -> AppResult<Vec<Genre>> {
        self.catalog.genres(media_kind).await
    }
}

/// Store whose backing table does not exist
pub struct FailingStore;

#[async_trait::async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::CacheUnavailable("relation \"pool_cache\" does not exist".to_string()))
    }

    async fn put(&self, _key: &str, _value: String, _ttl_secs: u64) -> AppResult<()> {
        Err(AppError::CacheUnavailable("relation \"pool_cache\" does not exist".to_string()))
    }
}

pub fn movie(id: u64, genres: &[u32], popularity: f64) -> TmdbItem {
    TmdbItem {
        id: Some(id),
        title: Some(format!("Movie {}", id)),
        overview: Some(format!(
            "Movie {} follows a cast of characters through a long day.",
            id
        )),
        genre_ids: genres.to_vec(),
        original_language: Some("en".to_string()),
        vote_average: Some(5.0 + (id % 40) as f64 / 10.0),
        popularity: Some(popularity),
        release_date: Some("2015-06-19".to_string()),
        poster_path: Some(format!("/poster-{}.jpg", id)),
        ..Default::default()
    }
}

pub fn series(id: u64, genres: &[u32], popularity: f64) -> TmdbItem {
    TmdbItem {
        id: Some(id),
        name: Some(format!("Show {}", id)),
        overview: Some(format!(
            "Show {} follows a cast of characters across several seasons.",
            id
        )),
        genre_ids: genres.to_vec(),
        original_language: Some("en".to_string()),
        vote_average: Some(7.5),
        popularity: Some(popularity),
        first_air_date: Some("2018-02-01".to_string()),
        poster_path: Some(format!("/show-{}.jpg", id)),
        ..Default::default()
    }
}

pub fn fast_settings() -> CatalogSettings {
    CatalogSettings {
        max_pages: 10,
        retry: RetryPolicy::new(1, 1, 2, false),
        min_request_interval: Duration::ZERO,
    }
}

pub fn service_with(source: Arc<dyn CatalogSource>, cache: ResultCache) -> ContentFilterService {
    ContentFilterService::new(
        source,
        Arc::new(GenreTaxonomyMapper::default()),
        Arc::new(QualityGate::new(LANGUAGES, 30, "https://image.tmdb.org/t/p/w500")),
        fast_settings(),
        PoolSettings {
            default_limit: 30,
            max_limit: 100,
            shuffle_seed: Some(42),
        },
        cache,
    )
}

/// Checks the invariants every pool must hold
pub fn assert_pool_invariants(criteria: &FilterCriteria, pool: &[PoolEntry]) {
    let genres = criteria.distinct_genres();

    assert!(pool.len() <= criteria.limit, "pool exceeds limit");

    let mut ids = std::collections::HashSet::new();
    for entry in pool {
        assert!(ids.insert(&entry.external_id), "duplicate {}", entry.external_id);
        assert!(!criteria.is_excluded(&entry.external_id), "excluded {}", entry.external_id);
        assert!(LANGUAGES.contains(&entry.original_language.as_str()));
        assert!(entry.overview.trim().chars().count() >= 30);
        assert_eq!(entry.media_kind, criteria.media_kind);

        let matched = genres.iter().filter(|g| entry.genre_ids.contains(g)).count();
        match entry.priority_tier {
            PriorityTier::Exact => assert_eq!(matched, genres.len()),
            PriorityTier::Partial => assert!(matched > 0 && matched < genres.len()),
            PriorityTier::Popular => {}
        }
    }

    assert!(
        pool.windows(2).all(|w| w[0].priority_tier <= w[1].priority_tier),
        "tiers out of order"
    );
}
