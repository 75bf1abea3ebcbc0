use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;

use crate::models::{CatalogItem, MediaKind, TmdbItem};

/// Overviews the provider returns in place of a real description
const PLACEHOLDER_OVERVIEWS: &[&str] = &[
    "no overview",
    "no overview available",
    "no overview found",
    "overview not available",
    "no description",
    "no description available",
    "n/a",
    "na",
    "tba",
    "tbd",
    "coming soon",
    "sin descripción",
    "sin descripcion",
    "sinopsis no disponible",
];

const MIN_RELEASE_YEAR: i32 = 1900;
const MAX_RELEASE_YEAR: i32 = 2100;

/// Why an item was kept out of every tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingId,
    MissingTitle,
    Language,
    Overview,
    MediaKind,
    Poster,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::MissingId => "missing id",
            Rejection::MissingTitle => "missing title",
            Rejection::Language => "language not allowed",
            Rejection::Overview => "overview missing or too short",
            Rejection::MediaKind => "media kind mismatch",
            Rejection::Poster => "missing poster",
        };
        write!(f, "{}", reason)
    }
}

/// Per-item validation applied to every raw provider result
#[derive(Debug, Clone)]
pub struct QualityGate {
    allowed_languages: HashSet<String>,
    min_overview_chars: usize,
    image_base_url: String,
}

impl QualityGate {
    pub fn new<I, S>(allowed_languages: I, min_overview_chars: usize, image_base_url: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_languages: allowed_languages
                .into_iter()
                .map(|code| code.as_ref().trim().to_lowercase())
                .filter(|code| !code.is_empty())
                .collect(),
            min_overview_chars,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_language_allowed(&self, code: &str) -> bool {
        self.allowed_languages
            .contains(code.trim().to_lowercase().as_str())
    }

    fn is_meaningful_overview(&self, overview: &str) -> bool {
        let trimmed = overview.trim();
        let lowered = trimmed.trim_end_matches('.').to_lowercase();
        !PLACEHOLDER_OVERVIEWS.contains(&lowered.as_str())
            && trimmed.chars().count() >= self.min_overview_chars
    }

    /// Turns a raw result into a catalog item, or says why it was dropped
    pub fn inspect(&self, raw: TmdbItem, requested: MediaKind) -> Result<CatalogItem, Rejection> {
        let id = raw.id.ok_or(Rejection::MissingId)?;

        if raw.media_kind() != Some(requested) {
            return Err(Rejection::MediaKind);
        }

        let title = raw
            .display_title()
            .ok_or(Rejection::MissingTitle)?
            .to_string();

        let language = raw
            .original_language
            .as_deref()
            .filter(|code| self.is_language_allowed(code))
            .ok_or(Rejection::Language)?
            .to_lowercase();

        let overview = raw
            .overview
            .as_deref()
            .filter(|text| self.is_meaningful_overview(text))
            .ok_or(Rejection::Overview)?
            .trim()
            .to_string();

        let poster_path = raw
            .poster_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .ok_or(Rejection::Poster)?
            .to_string();

        let poster_url = if poster_path.starts_with("http") {
            poster_path.clone()
        } else if poster_path.starts_with('/') {
            format!("{}{}", self.image_base_url, poster_path)
        } else {
            format!("{}/{}", self.image_base_url, poster_path)
        };

        let release_date = raw.air_date().filter(|date| plausible_date(date)).map(String::from);

        Ok(CatalogItem {
            external_id: id.to_string(),
            media_kind: requested,
            title,
            overview,
            genre_ids: raw.genre_ids.iter().copied().collect::<BTreeSet<_>>(),
            original_language: language,
            vote_average: normalize_rating(raw.vote_average),
            popularity: raw.popularity.filter(|p| p.is_finite() && *p >= 0.0).unwrap_or(0.0),
            release_date,
            poster_path,
            poster_url,
        })
    }
}

fn plausible_date(date: &str) -> bool {
    date.get(..4)
        .and_then(|year| year.parse::<i32>().ok())
        .map(|year| (MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year))
        .unwrap_or(false)
}

fn normalize_rating(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() && (0.0..=10.0).contains(&r) => r,
        _ => 0.0,
    }
}
