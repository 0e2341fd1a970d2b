pub mod health;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::diary::handlers as diary;
use crate::recipes::handlers as recipes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cooking_chart = Router::new()
        .route(
            "/api/recipes",
            get(recipes::handle_list).post(recipes::handle_save),
        )
        .route("/api/recipes/order", patch(recipes::handle_reorder))
        .route(
            "/api/recipes/:name",
            get(recipes::handle_get).delete(recipes::handle_delete),
        );

    Router::new()
        .route("/health", get(health::health_handler))
        // Diary
        .route("/", get(diary::handle_index))
        .route("/:slug", get(diary::handle_page))
        // Lab
        .nest("/lab/cooking_chart", cooking_chart)
        .with_state(state)
}
