use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::diary::parser::RenderMode;

static SQL_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Application configuration loaded from environment variables.
/// Startup fails if a present variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub diary: DiaryConfig,
    pub cooking_chart: CookingChartConfig,
}

#[derive(Debug, Clone)]
pub struct DiaryConfig {
    pub notion_token: String,
    /// Notion page id per 1-based diary page.
    pub page_ids: HashMap<u32, String>,
    /// Local Markdown file used when the remote source fails for a page.
    pub fallback_files: HashMap<u32, PathBuf>,
    pub total_pages: u32,
    pub cache_ttl_seconds: i64,
    pub render_mode: RenderMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    Postgres { url: String },
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct CookingChartConfig {
    pub editor_token: String,
    pub database: DatabaseConfig,
    pub table: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "5001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            diary: DiaryConfig::from_env()?,
            cooking_chart: CookingChartConfig::from_env()?,
        })
    }
}

impl DiaryConfig {
    fn from_env() -> Result<Self> {
        let total_pages = optional_env("DIARY_TOTAL_PAGES")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("DIARY_TOTAL_PAGES must be a positive integer")?
            .unwrap_or(1)
            .max(1);

        let mut page_ids = HashMap::new();
        let mut fallback_files = HashMap::new();
        for page in 1..=total_pages {
            let (id_key, file_key) = if page == 1 {
                ("NOTION_PAGE_ID".to_string(), "DIARY_FALLBACK_FILE".to_string())
            } else {
                (
                    format!("NOTION_PAGE_ID_{page}"),
                    format!("DIARY_FALLBACK_FILE_{page}"),
                )
            };
            if let Some(id) = optional_env(&id_key) {
                page_ids.insert(page, id);
            }
            if let Some(path) = optional_env(&file_key) {
                fallback_files.insert(page, PathBuf::from(path));
            }
        }
        // The primary page always has a local fallback.
        fallback_files
            .entry(1)
            .or_insert_with(|| PathBuf::from("diary.md"));

        let cache_ttl_seconds = optional_env("DIARY_CACHE_TTL_SECONDS")
            .map(|v| v.parse::<i64>())
            .transpose()
            .context("DIARY_CACHE_TTL_SECONDS must be an integer")?
            .unwrap_or(300);

        let render_mode = match optional_env("DIARY_RENDER_MODE").as_deref() {
            None | Some("plain") => RenderMode::Plain,
            Some("markdown") => RenderMode::Markdown,
            Some(other) => bail!("DIARY_RENDER_MODE must be 'plain' or 'markdown', got '{other}'"),
        };

        Ok(DiaryConfig {
            notion_token: optional_env("NOTION_TOKEN").unwrap_or_default(),
            page_ids,
            fallback_files,
            total_pages,
            cache_ttl_seconds,
            render_mode,
        })
    }
}

impl CookingChartConfig {
    fn from_env() -> Result<Self> {
        let url = optional_env("COOKING_CHART_DATABASE_URL").or_else(|| optional_env("DATABASE_URL"));
        let database = database_from_url(
            url.as_deref(),
            optional_env("COOKING_CHART_SQLITE_PATH").unwrap_or_else(|| "recipes.db".to_string()),
        );
        let default_table = match database {
            DatabaseConfig::Postgres { .. } => "cooking_chart_recipes",
            DatabaseConfig::Sqlite { .. } => "recipes",
        };
        let table = validate_table_name(
            &optional_env("COOKING_CHART_TABLE").unwrap_or_else(|| default_table.to_string()),
        )?;

        Ok(CookingChartConfig {
            editor_token: optional_env("COOKING_CHART_EDITOR_TOKEN").unwrap_or_default(),
            database,
            table,
        })
    }
}

/// Picks the storage engine from the database URL. Anything that is not a
/// Postgres URL selects the SQLite file.
pub fn database_from_url(url: Option<&str>, sqlite_path: String) -> DatabaseConfig {
    match url {
        Some(url) if url.starts_with("postgres://") => DatabaseConfig::Postgres {
            url: format!("postgresql://{}", &url["postgres://".len()..]),
        },
        Some(url) if url.starts_with("postgresql://") => DatabaseConfig::Postgres {
            url: url.to_string(),
        },
        _ => DatabaseConfig::Sqlite {
            path: PathBuf::from(sqlite_path),
        },
    }
}

/// The table name is interpolated into SQL, so it must be a plain identifier.
pub fn validate_table_name(name: &str) -> Result<String> {
    let name = name.trim();
    if !SQL_IDENTIFIER.is_match(name) {
        bail!("COOKING_CHART_TABLE must be a valid SQL identifier, got '{name}'");
    }
    Ok(name.to_string())
}

/// Reads a variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
