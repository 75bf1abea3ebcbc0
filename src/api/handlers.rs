use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{FilterCriteria, Genre, MediaKind, PoolEntry, TierCounts},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PoolRequest {
    /// "movie", "series" or "tv"
    pub media_kind: String,
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub exclude_ids: HashSet<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PoolResponse {
    pub media_kind: MediaKind,
    pub genre_ids: Vec<u32>,
    pub count: usize,
    pub tier_counts: TierCounts,
    pub entries: Vec<PoolEntry>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Builds a filtered pool for the posted criteria
pub async fn create_pool(
    State(state): State<AppState>,
    Json(request): Json<PoolRequest>,
) -> AppResult<Json<PoolResponse>> {
    let media_kind: MediaKind = request.media_kind.parse()?;
    let limit = request
        .limit
        .unwrap_or_else(|| state.service.default_limit());

    let criteria = FilterCriteria::new(media_kind, request.genre_ids)
        .with_limit(limit)
        .with_excluded(request.exclude_ids);

    let entries = state.service.create_filtered_pool(&criteria).await?;

    Ok(Json(PoolResponse {
        media_kind,
        genre_ids: criteria.genre_ids,
        count: entries.len(),
        tier_counts: TierCounts::of(&entries),
        entries,
    }))
}

/// Lists the genres of one media kind
pub async fn list_genres(
    State(state): State<AppState>,
    Path(media_kind): Path<String>,
) -> AppResult<Json<Vec<Genre>>> {
    let media_kind: MediaKind = media_kind.parse()?;
    Ok(Json(state.service.list_available_genres(media_kind).await))
}
