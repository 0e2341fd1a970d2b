use std::sync::Arc;

use crate::config::Config;
use crate::diary::DiaryResolver;
use crate::recipes::RecipeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Diary pages; owns the process-wide entry cache.
    pub diary: DiaryResolver,
    /// Recipe storage, engine chosen at startup from the database URL.
    pub recipes: Arc<dyn RecipeStore>,
}
