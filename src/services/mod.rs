pub mod catalog;
pub mod content_filter;
pub mod genre_mapping;
pub mod priority;
pub mod providers;
pub mod quality;
pub mod rate_limit;
pub mod retry;

pub use catalog::{CatalogClient, CatalogSettings};
pub use content_filter::{ContentFilterService, PoolSettings};
pub use genre_mapping::GenreTaxonomyMapper;
pub use priority::PriorityAlgorithm;
pub use providers::{CatalogSource, DiscoverQuery, SortKey, TmdbSource};
pub use quality::{QualityGate, Rejection};
pub use retry::RetryPolicy;
