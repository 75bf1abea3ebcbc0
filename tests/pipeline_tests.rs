mod common;

use std::sync::Arc;

use common::*;
use genre_pool::{
    db::{MemoryStore, ResultCache},
    error::AppError,
    models::{FilterCriteria, MediaKind, PriorityTier, TierCounts},
};

#[tokio::test]
async fn test_forty_exact_matches_fill_the_pool_from_tier_one() {
    let catalog = (1..=40).map(|id| movie(id, &[16, 35], id as f64)).collect();
    let source = StubSource::new(catalog);
    let service = service_with(source.clone(), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    assert_eq!(pool.len(), 30);
    assert!(pool.iter().all(|e| e.priority_tier == PriorityTier::Exact));
    assert_pool_invariants(&criteria, &pool);
}

#[tokio::test]
async fn test_short_exact_tier_is_topped_up_with_partial_matches() {
    let mut catalog: Vec<_> = (1..=10).map(|id| movie(id, &[16, 35], 1.0)).collect();
    catalog.extend((100..125).map(|id| movie(id, &[16], id as f64)));
    catalog.extend((200..225).map(|id| movie(id, &[35, 18], id as f64)));
    let service = service_with(StubSource::new(catalog), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    let counts = TierCounts::of(&pool);
    assert_eq!(counts.exact, 10);
    assert_eq!(counts.partial, 20);
    assert_eq!(counts.popular, 0);
    assert_pool_invariants(&criteria, &pool);

    // Partial matches come most popular first
    let partial: Vec<f64> = pool[10..].iter().map(|e| e.popularity).collect();
    assert!(partial.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_four_genres_rejected_before_any_provider_call() {
    let source = StubSource::new(vec![movie(1, &[1, 2, 3, 4], 1.0)]);
    let service = service_with(source.clone(), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![1, 2, 3, 4]);
    let result = service.create_filtered_pool(&criteria).await;

    assert!(matches!(result, Err(AppError::InvalidCriteria(_))));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_excluded_ids_never_returned() {
    let catalog = (1..=40).map(|id| movie(id, &[16, 35], id as f64)).collect();
    let service = service_with(StubSource::new(catalog), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35])
        .with_limit(30)
        .with_excluded(["1", "2", "3", "17", "40"]);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    assert_eq!(pool.len(), 30);
    assert_pool_invariants(&criteria, &pool);
}

#[tokio::test]
async fn test_second_identical_request_served_from_cache() {
    let catalog = (1..=40).map(|id| movie(id, &[16, 35], id as f64)).collect();
    let source = StubSource::new(catalog);
    let cache = ResultCache::new(Arc::new(MemoryStore::default()), 60);
    let service = service_with(source.clone(), cache);

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let first = service.create_filtered_pool(&criteria).await.unwrap();
    let calls_after_first = source.calls();
    assert!(calls_after_first > 0);

    let reordered = FilterCriteria::new(MediaKind::Movie, vec![35, 16]).with_limit(30);
    let second = service.create_filtered_pool(&reordered).await.unwrap();

    assert_eq!(source.calls(), calls_after_first);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_outage_pool_is_not_cached() {
    let catalog = (1..=40).map(|id| movie(id, &[16, 35], id as f64)).collect();
    // Every call of the first request fails, retries included
    let source = FlakySource::new(catalog, 8);
    let cache = ResultCache::new(Arc::new(MemoryStore::default()), 86_400);
    let service = service_with(source.clone(), cache);

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let during_outage = service.create_filtered_pool(&criteria).await.unwrap();
    assert!(during_outage.is_empty());
    assert_eq!(source.calls(), 8);

    let recovered = service.create_filtered_pool(&criteria).await.unwrap();
    assert_eq!(recovered.len(), 30);
    assert!(source.calls() > 8);
    assert_pool_invariants(&criteria, &recovered);

    // The healthy pool is cached
    let calls = source.calls();
    let cached = service.create_filtered_pool(&criteria).await.unwrap();
    assert_eq!(cached, recovered);
    assert_eq!(source.calls(), calls);
}

#[tokio::test]
async fn test_excluding_a_cached_pool_rebuilds_with_unseen_items() {
    let catalog = (1..=40).map(|id| movie(id, &[16, 35], id as f64)).collect();
    let source = StubSource::new(catalog);
    let cache = ResultCache::new(Arc::new(MemoryStore::default()), 60);
    let service = service_with(source.clone(), cache);

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let first = service.create_filtered_pool(&criteria).await.unwrap();
    assert_eq!(first.len(), 30);
    let calls_after_first = source.calls();

    let seen: Vec<String> = first.iter().map(|e| e.external_id.clone()).collect();
    let next = FilterCriteria::new(MediaKind::Movie, vec![16, 35])
        .with_limit(30)
        .with_excluded(seen);
    let second = service.create_filtered_pool(&next).await.unwrap();

    assert!(source.calls() > calls_after_first);
    let exact = second
        .iter()
        .filter(|e| e.priority_tier == PriorityTier::Exact)
        .count();
    assert_eq!(exact, 10);
    assert_pool_invariants(&next, &second);

    // The exclusion-shaped rebuild does not replace the shared entry
    let calls = source.calls();
    let again = service.create_filtered_pool(&criteria).await.unwrap();
    assert_eq!(again, first);
    assert_eq!(source.calls(), calls);
}

#[tokio::test]
async fn test_unavailable_cache_still_yields_a_pool() {
    let catalog = (1..=40).map(|id| movie(id, &[16, 35], id as f64)).collect();
    let source = StubSource::new(catalog);
    let service = service_with(source.clone(), ResultCache::new(Arc::new(FailingStore), 60));

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let first = service.create_filtered_pool(&criteria).await.unwrap();
    let second = service.create_filtered_pool(&criteria).await.unwrap();

    assert_eq!(first.len(), 30);
    assert_eq!(second.len(), 30);
    assert_pool_invariants(&criteria, &first);
}

#[tokio::test]
async fn test_quality_gate_filters_every_tier() {
    let mut catalog = Vec::new();
    for id in 1..=20 {
        let mut item = movie(id, &[16, 35], id as f64);
        match id % 4 {
            0 => item.original_language = Some("ja".to_string()),
            1 => item.overview = Some("Too short.".to_string()),
            2 => item.poster_path = None,
            _ => {}
        }
        catalog.push(item);
    }
    // Popular but foreign, must not leak through the fallback tier
    let mut foreign = movie(500, &[99], 1000.0);
    foreign.original_language = Some("ko".to_string());
    catalog.push(foreign);

    let service = service_with(StubSource::new(catalog), ResultCache::disabled());
    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    // Only ids 3, 7, 11, 15, 19 survive
    assert_eq!(pool.len(), 5);
    assert!(pool.iter().all(|e| e.external_id != "500"));
    assert_pool_invariants(&criteria, &pool);
}

#[tokio::test]
async fn test_cross_kind_items_rejected() {
    let mut catalog: Vec<_> = (1..=5).map(|id| movie(id, &[16], 1.0)).collect();
    catalog.extend((10..=12).map(|id| series(id, &[16], 1.0)));
    let service = service_with(StubSource::new(catalog), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Series, vec![16]).with_limit(10);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    assert_eq!(pool.len(), 3);
    assert!(pool.iter().all(|e| e.media_kind == MediaKind::Series));
}

#[tokio::test]
async fn test_provider_outage_is_an_empty_pool_not_an_error() {
    let source = Arc::new(DownSource::default());
    let service = service_with(source.clone(), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    assert!(pool.is_empty());
    // Tier 1, two Tier 2 genres and Tier 3, each tried twice
    assert_eq!(source.calls(), 8);
}

#[tokio::test]
async fn test_series_request_resolves_movie_genre() {
    let catalog = (1..=12).map(|id| series(id, &[10759, 18], id as f64)).collect();
    let service = service_with(StubSource::new(catalog), ResultCache::disabled());

    // Movie "Action" has no series counterpart of its own
    let criteria = FilterCriteria::new(MediaKind::Series, vec![28]).with_limit(10);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    assert_eq!(pool.len(), 10);
    assert!(pool.iter().all(|e| e.priority_tier == PriorityTier::Exact));
    assert!(pool.iter().all(|e| e.genre_ids.contains(&28)));
    assert_pool_invariants(&criteria, &pool);
}

#[tokio::test]
async fn test_popular_fallback_fills_remaining_slots() {
    let mut catalog: Vec<_> = (1..=2).map(|id| movie(id, &[16, 35], 1.0)).collect();
    catalog.extend((100..140).map(|id| movie(id, &[99], id as f64)));
    let service = service_with(StubSource::new(catalog), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(30);
    let pool = service.create_filtered_pool(&criteria).await.unwrap();

    let counts = TierCounts::of(&pool);
    assert_eq!(counts.exact, 2);
    assert_eq!(counts.partial, 0);
    assert_eq!(counts.popular, 28);
    assert_eq!(pool[2].external_id, "139");
    assert_pool_invariants(&criteria, &pool);
}

#[tokio::test]
async fn test_same_seed_gives_same_pool() {
    let catalog: Vec<_> = (1..=60).map(|id| movie(id, &[16, 35], 1.0)).collect();
    let first = service_with(StubSource::new(catalog.clone()), ResultCache::disabled());
    let second = service_with(StubSource::new(catalog), ResultCache::disabled());

    let criteria = FilterCriteria::new(MediaKind::Movie, vec![16, 35]).with_limit(20);
    let a = first.create_filtered_pool(&criteria).await.unwrap();
    let b = second.create_filtered_pool(&criteria).await.unwrap();

    let ids_a: Vec<_> = a.iter().map(|e| &e.external_id).collect();
    let ids_b: Vec<_> = b.iter().map(|e| &e.external_id).collect();
    assert_eq!(ids_a, ids_b);
}
