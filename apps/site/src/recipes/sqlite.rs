use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::AppError;
use crate::recipes::models::{OrderedRow, Recipe, RecipeSummary};
use crate::recipes::ordering::reconcile_order;
use crate::recipes::store::RecipeStore;

/// SQLite-backed store. `content` is stored as JSON text.
pub struct SqliteRecipeStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteRecipeStore {
    /// `table` must already be validated as an SQL identifier.
    pub fn new(pool: SqlitePool, table: String) -> Self {
        Self { pool, table }
    }

    /// Creates the table, adds `sort_order` to older tables, and gives rows
    /// without a position one at the end, in insertion order.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let t = &self.table;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {t} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                sort_order INTEGER
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        let has_sort_order: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM pragma_table_info('{t}') WHERE name = 'sort_order'"
        ))
        .fetch_one(&self.pool)
        .await?;
        if has_sort_order == 0 {
            info!("Adding sort_order column to {t}");
            sqlx::query(&format!("ALTER TABLE {t} ADD COLUMN sort_order INTEGER"))
                .execute(&self.pool)
                .await?;
        }

        let mut tx = self.pool.begin().await?;
        let mut next: i64 =
            sqlx::query_scalar(&format!("SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {t}"))
                .fetch_one(&mut *tx)
                .await?;
        let unordered: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM {t} WHERE sort_order IS NULL ORDER BY id ASC"
        ))
        .fetch_all(&mut *tx)
        .await?;
        for id in unordered {
            sqlx::query(&format!("UPDATE {t} SET sort_order = ? WHERE id = ?"))
                .bind(next)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            next += 1;
        }
        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl RecipeStore for SqliteRecipeStore {
    async fn list(&self) -> Result<Vec<RecipeSummary>, AppError> {
        Ok(sqlx::query_as::<_, RecipeSummary>(&format!(
            "SELECT name FROM {} ORDER BY sort_order ASC, updated_at DESC, name ASC",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, name: &str) -> Result<Option<Recipe>, AppError> {
        Ok(sqlx::query_as::<_, Recipe>(&format!(
            "SELECT name, content, updated_at FROM {} WHERE name = ?",
            self.table
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save(&self, name: &str, content: &Value) -> Result<(), AppError> {
        let t = &self.table;
        sqlx::query(&format!(
            r#"
            INSERT INTO {t}(name, content, updated_at, sort_order)
            VALUES(
                ?,
                ?,
                CURRENT_TIMESTAMP,
                COALESCE((SELECT MAX(sort_order) + 1 FROM {t}), 1)
            )
            ON CONFLICT(name) DO UPDATE SET
                content = excluded.content,
                updated_at = CURRENT_TIMESTAMP
            "#
        ))
        .bind(name)
        .bind(Json(content))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE name = ?", self.table))
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder(&self, names: &[String]) -> Result<(), AppError> {
        let t = &self.table;
        let mut tx = self.pool.begin().await?;

        let existing: Vec<OrderedRow> = sqlx::query_as(&format!(
            "SELECT id, name, COALESCE(sort_order, 0) AS sort_order FROM {t}"
        ))
        .fetch_all(&mut *tx)
        .await?;

        for (name, position) in reconcile_order(&existing, names) {
            sqlx::query(&format!("UPDATE {t} SET sort_order = ? WHERE name = ?"))
                .bind(position)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory store; a single connection keeps one shared database.
    pub async fn memory_store() -> SqliteRecipeStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteRecipeStore::new(pool, "recipes".into());
        store.init_schema().await.unwrap();
        store
    }

    async fn order_of(store: &SqliteRecipeStore) -> Vec<(String, i64)> {
        sqlx::query_as("SELECT name, sort_order FROM recipes ORDER BY sort_order ASC")
            .fetch_all(&store.pool)
            .await
            .unwrap()
    }

    fn names(list: Vec<RecipeSummary>) -> Vec<String> {
        list.into_iter().map(|r| r.name).collect()
    }

    #[tokio::test]
    async fn test_insert_appends_to_order() {
        let store = memory_store().await;
        store.save("a", &json!({"steps": []})).await.unwrap();
        store.save("b", &json!({})).await.unwrap();
        store.save("c", &json!({})).await.unwrap();

        assert_eq!(
            order_of(&store).await,
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
        assert_eq!(names(store.list().await.unwrap()), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_update_keeps_position_and_replaces_content() {
        let store = memory_store().await;
        store.save("a", &json!({"v": 1})).await.unwrap();
        store.save("b", &json!({"v": 1})).await.unwrap();
        sqlx::query("UPDATE recipes SET updated_at = '2000-01-01 00:00:00' WHERE name = 'a'")
            .execute(&store.pool)
            .await
            .unwrap();
        store.save("a", &json!({"v": 2})).await.unwrap();

        assert_eq!(
            order_of(&store).await,
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
        let recipe = store.get("a").await.unwrap().unwrap();
        assert_eq!(recipe.content.0, json!({"v": 2}));
        assert!(recipe.updated_at > Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_get_and_delete_missing() {
        let store = memory_store().await;
        assert!(store.get("ghost").await.unwrap().is_none());
        assert!(!store.delete("ghost").await.unwrap());

        store.save("real", &json!({})).await.unwrap();
        assert!(store.delete("real").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_applies_reconciled_order() {
        let store = memory_store().await;
        for name in ["a", "b", "c"] {
            store.save(name, &json!({})).await.unwrap();
        }
        store
            .reorder(&["c".to_string(), "z".to_string(), "a".to_string()])
            .await
            .unwrap();

        assert_eq!(names(store.list().await.unwrap()), vec!["c", "a", "b"]);
        assert!(store.get("z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_row_after_reorder_goes_last() {
        let store = memory_store().await;
        for name in ["a", "b"] {
            store.save(name, &json!({})).await.unwrap();
        }
        store.reorder(&["b".to_string()]).await.unwrap();
        store.save("c", &json!({})).await.unwrap();
        assert_eq!(names(store.list().await.unwrap()), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_schema_backfills_missing_positions() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE legacy (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, content TEXT NOT NULL, updated_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO legacy(name, content) VALUES ('x', '{}'), ('y', '{}')")
            .execute(&pool)
            .await
            .unwrap();

        let store = SqliteRecipeStore::new(pool, "legacy".into());
        store.init_schema().await.unwrap();

        assert_eq!(names(store.list().await.unwrap()), vec!["x", "y"]);
        store.save("z", &json!({})).await.unwrap();
        assert_eq!(names(store.list().await.unwrap()), vec!["x", "y", "z"]);
        let recipe = store.get("x").await.unwrap().unwrap();
        assert_eq!(recipe.content.0, json!({}));
    }
}
