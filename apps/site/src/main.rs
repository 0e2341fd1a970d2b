mod config;
mod db;
mod diary;
mod errors;
mod recipes;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::diary::notion::NotionClient;
use crate::diary::{DiaryCache, DiaryResolver};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting diary site v{}", env!("CARGO_PKG_VERSION"));

    // Diary: Notion source behind a TTL cache, local Markdown as fallback
    let notion = Arc::new(NotionClient::new(config.diary.notion_token.clone()));
    let cache = DiaryCache::new(config.diary.cache_ttl_seconds);
    let diary = DiaryResolver::new(notion, cache, &config.diary);
    info!(
        "Diary: {} page(s), {} configured, cache TTL {}s, {:?} rendering",
        config.diary.total_pages,
        config.diary.page_ids.len(),
        config.diary.cache_ttl_seconds,
        config.diary.render_mode
    );

    // Cooking chart storage
    let recipes = recipes::store::connect(&config.cooking_chart).await?;
    info!("Recipe table '{}' ready", config.cooking_chart.table);

    let state = AppState {
        config: config.clone(),
        diary,
        recipes,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
