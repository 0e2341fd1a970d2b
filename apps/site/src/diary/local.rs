//! Local Markdown fallback: entries start at lines of the form `## YYYY-MM-DD`.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::diary::models::{Block, DiaryEntry};
use crate::diary::parser::{EntryParser, RenderMode};

static DATE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^## (\d{4}-\d{2}-\d{2})").expect("date heading pattern is valid"));

/// Splits a Markdown document on date headings and renders each body.
/// Text above the first date heading belongs to no entry.
pub fn parse_markdown(source: &str, mode: RenderMode) -> Vec<DiaryEntry> {
    let mut parser = EntryParser::new(mode);
    let body = source
        .lines()
        .skip_while(|line| !DATE_HEADING.is_match(line));
    for line in body {
        match DATE_HEADING.captures(line) {
            Some(caps) => parser.push(&Block::Heading(vec![caps[1].to_string()])),
            None => parser.push(&Block::Paragraph(vec![line.to_string()])),
        }
    }
    parser.finish()
}

/// Loads the fallback file; a missing or unreadable file becomes a visible
/// error entry rather than an empty diary.
pub async fn load_entries(path: &Path, mode: RenderMode) -> Vec<DiaryEntry> {
    match tokio::fs::read_to_string(path).await {
        Ok(source) => parse_markdown(&source, mode),
        Err(e) => {
            warn!("Failed to read diary fallback {}: {e}", path.display());
            vec![DiaryEntry::error(format!(
                "Diary fallback file {} could not be read: {e}",
                path.display()
            ))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_splits_on_date_headings() {
        let source = "# Diary\nintro\n## 2025-06-22\nHello\n\n## 2025-06-23 rainy\nline one\nline two\n";
        let entries = parse_markdown(source, RenderMode::Plain);
        assert_eq!(
            entries,
            vec![
                DiaryEntry {
                    date: "6/22".into(),
                    html: "<p class='diary-block'>Hello</p>".into(),
                },
                DiaryEntry {
                    date: "6/23".into(),
                    html: "<p class='diary-block'>line one</p>\n<p class='diary-block'>line two</p>"
                        .into(),
                },
            ]
        );
    }

    #[test]
    fn test_preamble_is_not_part_of_first_entry() {
        let source = "# Diary\nabout this file\n## 2025-06-22\nHello\n";
        let entries = parse_markdown(source, RenderMode::Plain);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].html, "<p class='diary-block'>Hello</p>");
    }

    #[test]
    fn test_markdown_mode_keeps_file_paragraphs() {
        let source = "## 2025-06-22\nfirst\n\nsecond\n";
        let entries = parse_markdown(source, RenderMode::Markdown);
        assert_eq!(entries[0].html, "<p>first</p>\n<p>second</p>");
    }

    #[test]
    fn test_other_headings_are_body_text() {
        let source = "## 2025-06-22\n## not a date\n";
        let entries = parse_markdown(source, RenderMode::Plain);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].html, "<p class='diary-block'>## not a date</p>");
    }

    #[tokio::test]
    async fn test_loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "## 2025-06-22\nHello\n").unwrap();
        let entries = load_entries(file.path(), RenderMode::Plain).await;
        assert_eq!(entries[0].date, "6/22");
    }

    #[tokio::test]
    async fn test_missing_file_is_error_entry() {
        let dir = tempfile::tempdir().unwrap();
        let entries = load_entries(&dir.path().join("absent.md"), RenderMode::Plain).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "Error");
        assert!(entries[0].html.contains("absent.md"));
    }
}
