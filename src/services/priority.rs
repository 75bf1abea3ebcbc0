//! Three-tier pool selection.
//!
//! Tier 1 takes items carrying every requested genre, Tier 2 items carrying
//! some but not all of them, Tier 3 whatever is popular for the media kind.
//! A later tier only runs while the pool is still short of the limit.

use std::cmp::Ordering;
use std::collections::HashSet;

use futures::future::join_all;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    models::{CatalogItem, FilterCriteria, PoolEntry, PriorityTier},
    services::{catalog::CatalogClient, providers::SortKey},
};

/// Width of an equal-rating band in rating points
const RATING_BAND: f64 = 0.5;

/// Accumulates the pool across tiers
struct Selection {
    seen: HashSet<String>,
    entries: Vec<PoolEntry>,
    limit: usize,
}

impl Selection {
    fn new(criteria: &FilterCriteria) -> Self {
        Self {
            seen: criteria.exclude_ids.iter().cloned().collect(),
            entries: Vec::with_capacity(criteria.limit),
            limit: criteria.limit,
        }
    }

    fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.entries.len())
    }

    fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes candidates in order until full; returns how many were taken
    fn take_from(&mut self, candidates: Vec<CatalogItem>, tier: PriorityTier) -> usize {
        let before = self.entries.len();
        for item in candidates {
            if self.is_full() {
                break;
            }
            if self.seen.insert(item.external_id.clone()) {
                self.entries.push(PoolEntry::from_item(item, tier));
            }
        }
        self.entries.len() - before
    }
}

pub struct PriorityAlgorithm {
    client: CatalogClient,
    shuffle_seed: Option<u64>,
}

impl PriorityAlgorithm {
    /// `shuffle_seed` fixes the Tier 1 shuffle; `None` seeds from entropy
    pub fn new(client: CatalogClient, shuffle_seed: Option<u64>) -> Self {
        Self {
            client,
            shuffle_seed,
        }
    }

    /// Whether the last build ran on partial provider data; such a pool must
    /// not be cached
    pub fn is_degraded(&self) -> bool {
        self.client.is_degraded()
    }

    /// Builds a pool of at most `criteria.limit` entries, ordered by tier
    pub async fn build_pool(&self, criteria: &FilterCriteria) -> Vec<PoolEntry> {
        let genres = criteria.distinct_genres();
        let mut selection = Selection::new(criteria);
        let mut rng = match self.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Tier 1: intersection
        let exact = self
            .client
            .discover_pages(
                criteria.media_kind,
                &genres,
                SortKey::PopularityDesc,
                criteria.limit.saturating_mul(2),
            )
            .await;
        let mut exact: Vec<CatalogItem> = exact
            .into_iter()
            .filter(|item| item.contains_all(&genres))
            .collect();
        rank_by_rating_bands(&mut exact, &mut rng);
        let candidates = exact.len();
        let taken = selection.take_from(exact, PriorityTier::Exact);
        tracing::info!(tier = 1, candidates, taken, "Exact-match tier done");

        // Tier 2: union minus intersection. Genres collapsing onto one
        // provider genre have no partial matches.
        let distinct_queries = self.client.query_genres(&genres, criteria.media_kind).len();
        if !selection.is_full() && distinct_queries > 1 {
            let target = selection.remaining().saturating_mul(2);
            let per_genre = join_all(genres.iter().map(|genre| {
                self.client.discover_pages(
                    criteria.media_kind,
                    std::slice::from_ref(genre),
                    SortKey::PopularityDesc,
                    target,
                )
            }))
            .await;

            let mut merged = HashSet::new();
            let mut partial: Vec<CatalogItem> = per_genre
                .into_iter()
                .flatten()
                .filter(|item| merged.insert(item.external_id.clone()))
                .filter(|item| item.matched_genres(&genres) > 0 && !item.contains_all(&genres))
                .collect();
            partial.sort_by(by_popularity);

            let candidates = partial.len();
            let taken = selection.take_from(partial, PriorityTier::Partial);
            tracing::info!(tier = 2, candidates, taken, "Partial-match tier done");
        }

        // Tier 3: popular fallback, no genre validation
        if !selection.is_full() {
            let target = selection.remaining().saturating_mul(2) + selection.entries.len();
            let mut popular = self
                .client
                .discover_pages(criteria.media_kind, &[], SortKey::PopularityDesc, target)
                .await;
            popular.sort_by(by_popularity);

            let candidates = popular.len();
            let taken = selection.take_from(popular, PriorityTier::Popular);
            tracing::info!(tier = 3, candidates, taken, "Popular fallback tier done");
        }

        selection.entries
    }
}

/// Rating descending, shuffled within each rating band
fn rank_by_rating_bands(items: &mut [CatalogItem], rng: &mut StdRng) {
    items.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));

    let mut start = 0;
    while start < items.len() {
        let band = rating_band(items[start].vote_average);
        let end = items[start..]
            .iter()
            .position(|item| rating_band(item.vote_average) != band)
            .map_or(items.len(), |offset| start + offset);
        items[start..end].shuffle(rng);
        start = end;
    }
}

fn rating_band(rating: f64) -> i64 {
    (rating / RATING_BAND).floor() as i64
}

/// Popularity descending, external id ascending on ties
fn by_popularity(a: &CatalogItem, b: &CatalogItem) -> Ordering {
    b.popularity
        .total_cmp(&a.popularity)
        .then_with(|| a.external_id.cmp(&b.external_id))
}
