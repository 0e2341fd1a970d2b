use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DiaryConfig;
use crate::diary::cache::DiaryCache;
use crate::diary::local;
use crate::diary::models::DiaryEntry;
use crate::diary::notion::{fetch_all_blocks, BlockSource, NotionError};
use crate::diary::parser::{parse_blocks, RenderMode};

/// Resolves a diary page to entries: cache, then Notion, then the page's
/// local fallback file. Never fails; problems become visible error entries.
#[derive(Clone)]
pub struct DiaryResolver {
    source: Arc<dyn BlockSource>,
    cache: DiaryCache,
    page_ids: HashMap<u32, String>,
    fallback_files: HashMap<u32, PathBuf>,
    render_mode: RenderMode,
    total_pages: u32,
}

impl DiaryResolver {
    pub fn new(source: Arc<dyn BlockSource>, cache: DiaryCache, config: &DiaryConfig) -> Self {
        Self {
            source,
            cache,
            page_ids: config.page_ids.clone(),
            fallback_files: config.fallback_files.clone(),
            render_mode: config.render_mode,
            total_pages: config.total_pages,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub async fn resolve(&self, page: u32) -> Vec<DiaryEntry> {
        let Some(page_id) = self.page_ids.get(&page) else {
            warn!("No Notion page id configured for diary page {page}");
            let var = if page == 1 {
                "NOTION_PAGE_ID".to_string()
            } else {
                format!("NOTION_PAGE_ID_{page}")
            };
            return vec![DiaryEntry::error(format!(
                "Diary page {page} is not configured ({var} is not set)"
            ))];
        };

        match self.fetch_remote(page_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Notion fetch failed for diary page {page}: {e}");
                match self.fallback_files.get(&page) {
                    Some(path) => {
                        info!("Falling back to {} for diary page {page}", path.display());
                        local::load_entries(path, self.render_mode).await
                    }
                    None => vec![DiaryEntry::error(format!(
                        "Failed to load diary page {page}: {e}"
                    ))],
                }
            }
        }
    }

    async fn fetch_remote(&self, page_id: &str) -> Result<Vec<DiaryEntry>, NotionError> {
        if let Some(entries) = self.cache.get(page_id) {
            return Ok(entries);
        }
        let blocks = fetch_all_blocks(self.source.as_ref(), page_id).await?;
        let entries = parse_blocks(&blocks, self.render_mode);
        self.cache.put(page_id, entries.clone());
        Ok(entries)
    }
}
