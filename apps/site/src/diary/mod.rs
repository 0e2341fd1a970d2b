// Diary: Notion page blocks (or a local Markdown file) rendered as dated entries.
// All remote access goes through notion::BlockSource; the parser never sees cursors.

pub mod cache;
pub mod handlers;
pub mod local;
pub mod models;
pub mod notion;
pub mod parser;
pub mod render;
pub mod resolver;

pub use cache::DiaryCache;
pub use resolver::DiaryResolver;
