use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::{CookingChartConfig, DatabaseConfig};
use crate::db::{create_pg_pool, create_sqlite_pool};
use crate::errors::AppError;
use crate::recipes::models::{Recipe, RecipeSummary};
use crate::recipes::postgres::PgRecipeStore;
use crate::recipes::sqlite::SqliteRecipeStore;

/// Storage for cooking-chart recipes. Implement this to add an engine without
/// touching handlers.
///
/// Carried in `AppState` as `Arc<dyn RecipeStore>`.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Names in display order: `sort_order asc, updated_at desc, name asc`.
    async fn list(&self) -> Result<Vec<RecipeSummary>, AppError>;

    async fn get(&self, name: &str) -> Result<Option<Recipe>, AppError>;

    /// Upsert by name. New rows go to the end of the order; updates keep
    /// their position.
    async fn save(&self, name: &str, content: &Value) -> Result<(), AppError>;

    /// Returns false when no row matched.
    async fn delete(&self, name: &str) -> Result<bool, AppError>;

    /// Applies `ordering::reconcile_order` atomically.
    async fn reorder(&self, names: &[String]) -> Result<(), AppError>;
}

/// Opens the configured engine and prepares its table.
pub async fn connect(config: &CookingChartConfig) -> Result<Arc<dyn RecipeStore>> {
    match &config.database {
        DatabaseConfig::Postgres { url } => {
            let pool = create_pg_pool(url).await?;
            let store = PgRecipeStore::new(pool, config.table.clone());
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
        DatabaseConfig::Sqlite { path } => {
            let pool = create_sqlite_pool(path).await?;
            let store = SqliteRecipeStore::new(pool, config.table.clone());
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
