use std::sync::Arc;

use crate::{
    config::Config,
    db::{CacheMiss, ResultCache},
    error::AppResult,
    models::{FilterCriteria, Genre, MediaKind, PoolEntry},
    services::{
        catalog::{CatalogClient, CatalogSettings},
        genre_mapping::GenreTaxonomyMapper,
        priority::PriorityAlgorithm,
        providers::{CatalogSource, TmdbSource},
        quality::QualityGate,
    },
};

/// Pool sizing
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Fixed seed for the Tier 1 shuffle
    pub shuffle_seed: Option<u64>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            default_limit: crate::models::DEFAULT_LIMIT,
            max_limit: 100,
            shuffle_seed: None,
        }
    }
}

/// Entry point for building filtered pools
///
/// Holds only shared, read-only collaborators. Rate limiting and retry state
/// live in a `CatalogClient` built per call.
pub struct ContentFilterService {
    source: Arc<dyn CatalogSource>,
    mapper: Arc<GenreTaxonomyMapper>,
    gate: Arc<QualityGate>,
    catalog: CatalogSettings,
    pool: PoolSettings,
    cache: ResultCache,
}

impl ContentFilterService {
    /// Creates a new content filter service
    pub fn new(
        source: Arc<dyn CatalogSource>,
        mapper: Arc<GenreTaxonomyMapper>,
        gate: Arc<QualityGate>,
        catalog: CatalogSettings,
        pool: PoolSettings,
        cache: ResultCache,
    ) -> Self {
        Self {
            source,
            mapper,
            gate,
            catalog,
            pool,
            cache,
        }
    }

    /// Wires the TMDB source, the default genre table and the configured
    /// quality gate
    pub fn from_config(config: &Config, cache: ResultCache) -> AppResult<Self> {
        let source = Arc::new(TmdbSource::from_config(config)?);
        let gate = QualityGate::new(
            &config.allowed_languages,
            config.min_overview_chars,
            &config.tmdb_image_url,
        );

        Ok(Self::new(
            source,
            Arc::new(GenreTaxonomyMapper::default()),
            Arc::new(gate),
            CatalogSettings::from_config(config),
            PoolSettings {
                default_limit: config.default_pool_limit,
                max_limit: config.max_pool_limit,
                shuffle_seed: config.pool_shuffle_seed,
            },
            cache,
        ))
    }

    pub fn default_limit(&self) -> usize {
        self.pool.default_limit
    }

    fn catalog_client(&self) -> CatalogClient {
        CatalogClient::new(
            self.source.clone(),
            self.mapper.clone(),
            self.gate.clone(),
            &self.catalog,
        )
    }

    /// Builds the pool for `criteria`
    ///
    /// Only invalid criteria fail. Provider and cache trouble shrink the pool
    /// or skip the cache.
    pub async fn create_filtered_pool(&self, criteria: &FilterCriteria) -> AppResult<Vec<PoolEntry>> {
        criteria.validate(self.pool.max_limit)?;

        match self.cache.get(criteria).await {
            Ok(pool) => {
                tracing::debug!(
                    media_kind = %criteria.media_kind,
                    genres = ?criteria.genre_ids,
                    count = pool.len(),
                    "Pool cache hit"
                );
                return Ok(pool);
            }
            Err(CacheMiss::Disabled) => {}
            Err(miss) => {
                tracing::debug!(
                    media_kind = %criteria.media_kind,
                    genres = ?criteria.genre_ids,
                    reason = %miss,
                    "Pool cache miss"
                );
            }
        }

        let genres = criteria.distinct_genres();
        let client = self.catalog_client().with_label_scope(&genres);
        let algorithm = PriorityAlgorithm::new(client, self.pool.shuffle_seed);
        let pool = algorithm.build_pool(criteria).await;

        if pool.len() < criteria.limit {
            tracing::info!(
                media_kind = %criteria.media_kind,
                genres = ?criteria.genre_ids,
                count = pool.len(),
                limit = criteria.limit,
                "Pool shorter than requested"
            );
        }

        if algorithm.is_degraded() {
            tracing::warn!(
                media_kind = %criteria.media_kind,
                genres = ?criteria.genre_ids,
                count = pool.len(),
                "Pool built from partial provider data, not caching"
            );
        } else if !criteria.exclude_ids.is_empty() {
            // The entry is shared by every request with this fingerprint
            tracing::debug!(
                media_kind = %criteria.media_kind,
                genres = ?criteria.genre_ids,
                "Pool shaped by exclusions, not caching"
            );
        } else {
            self.cache.put(criteria, &pool).await;
        }

        tracing::info!(
            media_kind = %criteria.media_kind,
            genres = ?criteria.genre_ids,
            count = pool.len(),
            "Built filtered pool"
        );

        Ok(pool)
    }

    /// Genres of `media_kind` sorted by name
    ///
    /// Falls back to the static vocabulary when the provider has nothing.
    pub async fn list_available_genres(&self, media_kind: MediaKind) -> Vec<Genre> {
        let mut genres = self.catalog_client().list_genres(media_kind).await;

        if genres.is_empty() {
            tracing::info!(media_kind = %media_kind, "Using static genre list");
            genres = self.mapper.known_genres(media_kind);
        }

        for genre in genres.iter_mut().filter(|g| g.name.trim().is_empty()) {
            if let Some(name) = self.mapper.genre_name(genre.id, media_kind) {
                genre.name = name.to_string();
            }
        }

        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        genres
    }
}
