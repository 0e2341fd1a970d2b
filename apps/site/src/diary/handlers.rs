use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::diary::render::render_page;
use crate::state::AppState;

/// GET /
pub async fn handle_index(State(state): State<AppState>) -> Response {
    render(&state, 1).await
}

/// GET /page{n}
pub async fn handle_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match parse_page_slug(&slug) {
        Some(page) if page <= state.diary.total_pages() => render(&state, page).await,
        _ => (StatusCode::NOT_FOUND, Html("<h1>404 Not Found</h1>")).into_response(),
    }
}

async fn render(state: &AppState, page: u32) -> Response {
    let entries = state.diary.resolve(page).await;
    Html(render_page(&entries, page, state.diary.total_pages())).into_response()
}

/// `page3` → 3. Zero and anything else → None.
fn parse_page_slug(slug: &str) -> Option<u32> {
    let digits = slug.strip_prefix("page")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n >= 1)
}
