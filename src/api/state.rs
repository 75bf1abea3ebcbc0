use std::sync::Arc;

use crate::services::ContentFilterService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContentFilterService>,
}

impl AppState {
    /// Creates state around an already wired service
    pub fn new(service: ContentFilterService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
