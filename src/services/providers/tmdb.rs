/// TMDB discover API provider
///
/// API Flow:
/// 1. Discover: /discover/{movie|tv}?with_genres=a,b&sort_by=...&page=n
/// 2. Genres: /genre/{movie|tv}/list
///
/// Only classification of failures happens here. Throttling and retries are
/// owned by the request-local `CatalogClient`.
use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client as HttpClient, Response, StatusCode};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Genre, MediaKind, TmdbDiscoverPage, TmdbGenreList},
    services::providers::{CatalogSource, DiscoverQuery},
};

#[derive(Clone)]
pub struct TmdbSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    include_adult: bool,
}

impl TmdbSource {
    /// Creates a new TMDB source with a per-request timeout
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        include_adult: bool,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            include_adult,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_language.clone(),
            config.tmdb_include_adult,
            Duration::from_secs(config.tmdb_request_timeout_secs),
        )
    }

    fn discover_url(&self, media_kind: MediaKind) -> String {
        format!("{}/discover/{}", self.api_url, media_kind.provider_segment())
    }

    fn genres_url(&self, media_kind: MediaKind) -> String {
        format!("{}/genre/{}/list", self.api_url, media_kind.provider_segment())
    }

    fn discover_params(&self, query: &DiscoverQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
            ("include_adult", self.include_adult.to_string()),
            ("sort_by", query.sort.as_param().to_string()),
            ("page", query.page.max(1).to_string()),
        ];

        if let Some(genres) = query.genres_csv() {
            params.push(("with_genres", genres));
        }

        params
    }

    /// Turns a non-success response into the matching error
    async fn error_from(response: Response) -> AppError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.unwrap_or_default();

        classify_status(status, retry_after, &body)
    }
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn classify_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> AppError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return AppError::RateLimited { retry_after };
    }

    if status.is_server_error() {
        return AppError::ProviderUnavailable(format!(
            "TMDB API returned status {}: {}",
            status, body
        ));
    }

    AppError::ExternalApi(format!("TMDB API returned status {}: {}", status, body))
}

#[async_trait::async_trait]
impl CatalogSource for TmdbSource {
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<TmdbDiscoverPage> {
        let response = self
            .http_client
            .get(self.discover_url(query.media_kind))
            .query(&self.discover_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let page: TmdbDiscoverPage = response.json().await?;

        tracing::debug!(
            media_kind = %query.media_kind,
            genres = ?query.genre_ids,
            page = page.page,
            total_pages = page.total_pages,
            results = page.results.len(),
            "Fetched discover page"
        );

        Ok(page)
    }

    async fn genres(&self, media_kind: MediaKind) -> AppResult<Vec<Genre>> {
        let response = self
            .http_client
            .get(self.genres_url(media_kind))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let list: TmdbGenreList = response.json().await?;
        Ok(list.genres)
    }
}
