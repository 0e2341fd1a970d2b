use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::recipes::models::{OrderedRow, Recipe, RecipeSummary};
use crate::recipes::ordering::reconcile_order;
use crate::recipes::store::RecipeStore;

/// PostgreSQL-backed store. `content` is JSONB.
pub struct PgRecipeStore {
    pool: PgPool,
    table: String,
}

impl PgRecipeStore {
    /// `table` must already be validated as an SQL identifier.
    pub fn new(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }

    /// Creates the table and gives rows without a position one at the end,
    /// in insertion order.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let t = &self.table;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {t} (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                content JSONB NOT NULL,
                updated_at TIMESTAMPTZ DEFAULT NOW(),
                sort_order INTEGER
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        let mut tx = self.pool.begin().await?;
        let mut next: i64 = sqlx::query_scalar(&format!(
            "SELECT (COALESCE(MAX(sort_order), 0) + 1)::BIGINT FROM {t}"
        ))
        .fetch_one(&mut *tx)
        .await?;
        let unordered: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM {t} WHERE sort_order IS NULL ORDER BY id ASC"
        ))
        .fetch_all(&mut *tx)
        .await?;
        for id in unordered {
            sqlx::query(&format!("UPDATE {t} SET sort_order = $1::INTEGER WHERE id = $2"))
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
impl RecipeStore for PgRecipeStore {
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
            "SELECT name, content, updated_at FROM {} WHERE name = $1",
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
                $1,
                $2,
                NOW(),
                COALESCE((SELECT MAX(sort_order) + 1 FROM {t}), 1)
            )
            ON CONFLICT(name) DO UPDATE SET
                content = excluded.content,
                updated_at = NOW()
            "#
        ))
        .bind(name)
        .bind(Json(content))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE name = $1", self.table))
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder(&self, names: &[String]) -> Result<(), AppError> {
        let t = &self.table;
        let mut tx = self.pool.begin().await?;

        // Row locks keep a concurrent reorder from reading a half-applied order.
        let existing: Vec<OrderedRow> = sqlx::query_as(&format!(
            "SELECT id, name, COALESCE(sort_order, 0)::BIGINT AS sort_order FROM {t} FOR UPDATE"
        ))
        .fetch_all(&mut *tx)
        .await?;

        for (name, position) in reconcile_order(&existing, names) {
            sqlx::query(&format!(
                "UPDATE {t} SET sort_order = $1::INTEGER WHERE name = $2"
            ))
            .bind(position)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
