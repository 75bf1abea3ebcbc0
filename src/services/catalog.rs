//! Request-local access to the catalog provider.
//!
//! Every outbound call goes through the client's own throttle and retry
//! policy, and every raw result goes through the quality gate before it is
//! handed to a caller. Failed calls degrade to "no results".

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    models::{CatalogItem, Genre, MediaKind, TmdbItem},
    services::{
        genre_mapping::GenreTaxonomyMapper,
        providers::{CatalogSource, DiscoverQuery, SortKey},
        quality::QualityGate,
        rate_limit::RequestThrottle,
        retry::{retry_with_backoff, RetryPolicy},
    },
};

/// Knobs shared by every client the service builds
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Page ceiling for one paginated walk
    pub max_pages: u32,
    pub retry: RetryPolicy,
    pub min_request_interval: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            max_pages: 10,
            retry: RetryPolicy::default(),
            min_request_interval: Duration::from_millis(250),
        }
    }
}

impl CatalogSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.max_pages.max(1),
            retry: RetryPolicy::new(
                config.tmdb_max_retries,
                config.tmdb_retry_base_delay_ms,
                config.tmdb_retry_max_delay_ms,
                true,
            ),
            min_request_interval: Duration::from_millis(config.tmdb_min_request_interval_ms),
        }
    }
}

/// Result of one discover page after the quality gate
struct GatedPage {
    items: Vec<CatalogItem>,
    raw_count: usize,
    total_pages: u32,
}

pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
    mapper: Arc<GenreTaxonomyMapper>,
    gate: Arc<QualityGate>,
    retry: RetryPolicy,
    throttle: RequestThrottle,
    max_pages: u32,
    /// Requested genres that returned items are re-labelled with
    label_scope: Vec<u32>,
    /// Set once any discover call failed after retries
    degraded: AtomicBool,
}

impl CatalogClient {
    /// Creates a client with a fresh throttle
    pub fn new(
        source: Arc<dyn CatalogSource>,
        mapper: Arc<GenreTaxonomyMapper>,
        gate: Arc<QualityGate>,
        settings: &CatalogSettings,
    ) -> Self {
        Self {
            source,
            mapper,
            gate,
            retry: settings.retry.clone(),
            throttle: RequestThrottle::new(settings.min_request_interval),
            max_pages: settings.max_pages.max(1),
            label_scope: Vec::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// Items carrying a mapped genre are also labelled with the requested
    /// genre it was mapped from, for every genre in `genre_ids`.
    pub fn with_label_scope(mut self, genre_ids: &[u32]) -> Self {
        self.label_scope = genre_ids.to_vec();
        self
    }

    /// Whether some discover call of this client came back with nothing
    /// because the provider failed
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Distinct provider genres `genre_ids` are queried as
    pub fn query_genres(&self, genre_ids: &[u32], media_kind: MediaKind) -> Vec<u32> {
        self.mapper.resolve_all(genre_ids, media_kind)
    }

    /// One page of discover results; `genre_ids` are ANDed
    pub async fn discover(
        &self,
        media_kind: MediaKind,
        genre_ids: &[u32],
        sort: SortKey,
        page: u32,
    ) -> Vec<CatalogItem> {
        self.fetch_page(media_kind, genre_ids, sort, page)
            .await
            .map(|gated| gated.items)
            .unwrap_or_default()
    }

    /// Walks pages until `target` distinct items are collected, the provider
    /// runs out of pages, a page comes back empty, or the page ceiling is hit
    pub async fn discover_pages(
        &self,
        media_kind: MediaKind,
        genre_ids: &[u32],
        sort: SortKey,
        target: usize,
    ) -> Vec<CatalogItem> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for page in 1..=self.max_pages {
            let Some(gated) = self.fetch_page(media_kind, genre_ids, sort, page).await else {
                break;
            };

            collected.extend(
                gated
                    .items
                    .into_iter()
                    .filter(|item| seen.insert(item.external_id.clone())),
            );

            if collected.len() >= target || gated.raw_count == 0 || page >= gated.total_pages {
                break;
            }
        }

        tracing::debug!(
            media_kind = %media_kind,
            genres = ?genre_ids,
            collected = collected.len(),
            target,
            "Paginated discover finished"
        );

        collected
    }

    /// Genre vocabulary of `media_kind`; empty when the provider fails
    pub async fn list_genres(&self, media_kind: MediaKind) -> Vec<Genre> {
        let result = retry_with_backoff(
            |_| async move {
                self.throttle.wait().await;
                self.source.genres(media_kind).await
            },
            &self.retry,
        )
        .await;

        match result {
            Ok(genres) => genres,
            Err(e) => {
                tracing::warn!(
                    media_kind = %media_kind,
                    error = %e,
                    "Genre list request failed"
                );
                Vec::new()
            }
        }
    }

    async fn fetch_page(
        &self,
        media_kind: MediaKind,
        genre_ids: &[u32],
        sort: SortKey,
        page: u32,
    ) -> Option<GatedPage> {
        let query = DiscoverQuery {
            media_kind,
            genre_ids: self.query_genres(genre_ids, media_kind),
            sort,
            page,
        };
        let query = &query;

        let result = retry_with_backoff(
            |_| async move {
                self.throttle.wait().await;
                self.source.discover(query).await
            },
            &self.retry,
        )
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.degraded.store(true, Ordering::Relaxed);
                tracing::warn!(
                    media_kind = %media_kind,
                    genres = ?query.genre_ids,
                    page,
                    error = %e,
                    "Discover request failed, treating as no results"
                );
                return None;
            }
        };

        let raw_count = response.results.len();
        let labels = self.labels_for(genre_ids, media_kind);
        let items: Vec<CatalogItem> = response
            .results
            .into_iter()
            .filter_map(|raw| self.admit(raw, media_kind, &labels))
            .collect();

        if items.len() < raw_count {
            tracing::debug!(
                media_kind = %media_kind,
                page,
                kept = items.len(),
                dropped = raw_count - items.len(),
                "Quality gate dropped items"
            );
        }

        Some(GatedPage {
            items,
            raw_count,
            total_pages: response.total_pages,
        })
    }

    /// `(mapped, requested)` pairs for every requested genre the mapper moves
    fn labels_for(&self, genre_ids: &[u32], media_kind: MediaKind) -> Vec<(u32, u32)> {
        self.label_scope
            .iter()
            .chain(genre_ids)
            .map(|&requested| (self.mapper.resolve(requested, media_kind), requested))
            .filter(|(mapped, requested)| mapped != requested)
            .collect()
    }

    fn admit(
        &self,
        mut raw: TmdbItem,
        media_kind: MediaKind,
        labels: &[(u32, u32)],
    ) -> Option<CatalogItem> {
        for &(mapped, requested) in labels {
            if raw.genre_ids.contains(&mapped) && !raw.genre_ids.contains(&requested) {
                raw.genre_ids.push(requested);
            }
        }

        let id = raw.id;
        match self.gate.inspect(raw, media_kind) {
            Ok(item) => Some(item),
            Err(reason) => {
                tracing::debug!(id = ?id, reason = %reason, "Rejected catalog item");
                None
            }
        }
    }
}
