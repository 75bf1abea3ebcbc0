use serde::Deserialize;

/// Backing store for computed pools
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
    #[serde(alias = "none", alias = "off")]
    Disabled,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL prepended to poster paths
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Locale sent with every discover request
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    #[serde(default)]
    pub tmdb_include_adult: bool,

    /// Minimum delay between two outbound provider calls
    #[serde(default = "default_min_request_interval_ms")]
    pub tmdb_min_request_interval_ms: u64,

    #[serde(default = "default_max_retries")]
    pub tmdb_max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub tmdb_retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub tmdb_retry_max_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub tmdb_request_timeout_secs: u64,

    /// Page ceiling for a single paginated discover walk
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_pool_limit")]
    pub default_pool_limit: usize,

    #[serde(default = "default_max_pool_limit")]
    pub max_pool_limit: usize,

    #[serde(default = "default_min_overview_chars")]
    pub min_overview_chars: usize,

    /// Original-language codes accepted by the quality gate
    #[serde(default = "default_allowed_languages")]
    pub allowed_languages: Vec<String>,

    /// Fixed seed for the tier-1 shuffle; entropy when unset
    #[serde(default)]
    pub pool_shuffle_seed: Option<u64>,

    #[serde(default = "default_cache_backend")]
    pub cache_backend: CacheBackend,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    #[serde(default = "default_pool_cache_ttl_secs")]
    pub pool_cache_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_min_request_interval_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_pages() -> u32 {
    10
}

fn default_pool_limit() -> usize {
    30
}

fn default_max_pool_limit() -> usize {
    100
}

fn default_min_overview_chars() -> usize {
    30
}

fn default_allowed_languages() -> Vec<String> {
    ["en", "es", "fr", "it", "de", "pt", "nl", "sv", "da", "no", "fi", "ca"]
        .iter()
        .map(|code| code.to_string())
        .collect()
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Redis
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_pool_cache_ttl_secs() -> u64 {
    86400
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.tmdb_api_key.trim().is_empty() {
            anyhow::bail!("TMDB_API_KEY must not be empty");
        }
        if self.default_pool_limit == 0 || self.default_pool_limit > self.max_pool_limit {
            anyhow::bail!(
                "DEFAULT_POOL_LIMIT must be between 1 and MAX_POOL_LIMIT ({})",
                self.max_pool_limit
            );
        }
        if self.max_pages == 0 {
            anyhow::bail!("MAX_PAGES must be at least 1");
        }
        Ok(())
    }
}
