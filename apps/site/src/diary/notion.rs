/// Notion client — the only place that talks to the Notion API.
///
/// The rest of the diary code depends on `BlockSource`, so the resolver can be
/// exercised against an in-memory source.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::diary::models::Block;

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Notion token is not configured")]
    MissingToken,
}

/// One page of a block-children listing.
#[derive(Debug, Clone, Default)]
pub struct BlockPage {
    pub blocks: Vec<Block>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// The single capability the diary needs from the remote service.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn list_children(
        &self,
        page_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockPage, NotionError>;
}

/// Follows `next_cursor` while `has_more` and returns the flattened blocks.
pub async fn fetch_all_blocks(
    source: &dyn BlockSource,
    page_id: &str,
) -> Result<Vec<Block>, NotionError> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source.list_children(page_id, cursor.as_deref()).await?;
        debug!(
            "Fetched {} blocks from {page_id} (has_more={})",
            page.blocks.len(),
            page.has_more
        );
        blocks.extend(page.blocks);

        match (page.has_more, page.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            _ => break,
        }
    }

    Ok(blocks)
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    results: Vec<RawBlock>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(flatten)]
    body: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RichTextBody {
    #[serde(default)]
    rich_text: Vec<RichText>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    #[serde(default)]
    plain_text: String,
}

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    message: String,
}

impl RawBlock {
    fn into_block(self) -> Block {
        let runs = || {
            self.body
                .get(&self.block_type)
                .cloned()
                .and_then(|v| serde_json::from_value::<RichTextBody>(v).ok())
                .map(|b| b.rich_text.into_iter().map(|t| t.plain_text).collect())
                .unwrap_or_default()
        };
        match self.block_type.as_str() {
            "heading_1" | "heading_2" | "heading_3" => Block::Heading(runs()),
            "paragraph" => Block::Paragraph(runs()),
            _ => Block::Other,
        }
    }
}

#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    token: String,
}

impl NotionClient {
    pub fn new(token: String) -> Self {
        Self {
            client: Client::new(),
            token,
        }
    }
}

#[async_trait]
impl BlockSource for NotionClient {
    async fn list_children(
        &self,
        page_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockPage, NotionError> {
        if self.token.is_empty() {
            return Err(NotionError::MissingToken);
        }

        let mut request = self
            .client
            .get(format!("{NOTION_API_URL}/blocks/{page_id}/children"))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .query(&[("page_size", PAGE_SIZE.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<NotionErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let listing: ChildrenResponse = response.json().await?;
        Ok(BlockPage {
            blocks: listing
                .results
                .into_iter()
                .map(RawBlock::into_block)
                .collect(),
            has_more: listing.has_more,
            next_cursor: listing.next_cursor,
        })
    }
}
