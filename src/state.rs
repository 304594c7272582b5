use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::services::TextExtractor;

/// Shared application state injected into the route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: TextExtractor,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let extractor = TextExtractor::new(config.upload_dir.clone());
        Self {
            config: Arc::new(config),
            extractor,
            started_at: Instant::now(),
        }
    }
}
