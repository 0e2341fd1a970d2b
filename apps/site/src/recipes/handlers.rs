use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::recipes::models::{Recipe, RecipeSummary};
use crate::recipes::validation::{parse_body, require_editor, validate_names, validate_save};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EditorKey {
    pub key: Option<String>,
}

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET /lab/cooking_chart/api/recipes
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    Ok(Json(state.recipes.list().await?))
}

/// GET /lab/cooking_chart/api/recipes/:name
pub async fn handle_get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Recipe>, AppError> {
    state
        .recipes
        .get(&name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("not found".into()))
}

/// POST /lab/cooking_chart/api/recipes?key=
pub async fn handle_save(
    State(state): State<AppState>,
    Query(params): Query<EditorKey>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    require_editor(&state.config.cooking_chart.editor_token, params.key.as_deref())?;
    let (name, content) = validate_save(&parse_body(&body))?;

    state.recipes.save(&name, &content).await?;
    info!("Saved recipe {name}");
    Ok(ok())
}

/// DELETE /lab/cooking_chart/api/recipes/:name?key=
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<EditorKey>,
) -> Result<Json<Value>, AppError> {
    require_editor(&state.config.cooking_chart.editor_token, params.key.as_deref())?;

    if !state.recipes.delete(&name).await? {
        return Err(AppError::NotFound("not found".into()));
    }
    info!("Deleted recipe {name}");
    Ok(ok())
}

/// PATCH /lab/cooking_chart/api/recipes/order?key=
pub async fn handle_reorder(
    State(state): State<AppState>,
    Query(params): Query<EditorKey>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    require_editor(&state.config.cooking_chart.editor_token, params.key.as_deref())?;
    let names = validate_names(&parse_body(&body))?;

    state.recipes.reorder(&names).await?;
    info!("Reordered recipes ({} names submitted)", names.len());
    Ok(ok())
}
