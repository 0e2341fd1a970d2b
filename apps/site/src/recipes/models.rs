use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct RecipeSummary {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub name: String,
    pub content: Json<Value>,
    pub updated_at: DateTime<Utc>,
}

/// Row view used when re-sequencing; `id` is the immutable insertion sequence.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OrderedRow {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
}
