//! Groups a flat block sequence into dated diary entries.
//!
//! A heading opens a new entry; paragraph lines accumulate under it until the
//! next heading or the end of input. Lines seen before any dated heading are
//! held and land in the first entry. Entries without any lines are never
//! emitted, and the last open entry is always flushed.

use chrono::{Datelike, NaiveDate};
use pulldown_cmark::{html, Options, Parser};

use crate::diary::models::{escape_html, Block, DiaryEntry};

/// How accumulated lines become HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Each line wrapped as `<p class='diary-block'>`.
    #[default]
    Plain,
    /// Raw lines, blanks included, converted as one Markdown document.
    Markdown,
}

#[derive(Debug, Default)]
pub struct EntryParser {
    mode: RenderMode,
    current_date: Option<String>,
    current_lines: Vec<String>,
    entries: Vec<DiaryEntry>,
}

impl EntryParser {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn push(&mut self, block: &Block) {
        match block {
            Block::Heading(runs) => {
                self.flush();
                self.current_date = runs
                    .first()
                    .filter(|text| !text.is_empty())
                    .map(|text| display_date(text));
            }
            Block::Paragraph(runs) if !runs.is_empty() => {
                let text = runs.concat();
                match self.mode {
                    RenderMode::Plain => self.current_lines.extend(
                        text.split('\n')
                            .map(str::trim)
                            .filter(|line| !line.is_empty())
                            .map(str::to_string),
                    ),
                    // Markdown needs blank lines and indentation intact.
                    RenderMode::Markdown => self
                        .current_lines
                        .extend(text.split('\n').map(str::to_string)),
                }
            }
            _ => {}
        }
    }

    pub fn finish(mut self) -> Vec<DiaryEntry> {
        self.flush();
        self.entries
    }

    /// Closes the open entry. Lines gathered while no date is open stay
    /// pending and land in the next dated entry.
    fn flush(&mut self) {
        let Some(date) = self.current_date.take() else {
            return;
        };
        let lines = std::mem::take(&mut self.current_lines);
        if lines.iter().all(|line| line.trim().is_empty()) {
            return;
        }
        self.entries.push(DiaryEntry {
            date,
            html: render_lines(&lines, self.mode),
        });
    }
}

/// Reduces a complete block sequence to entries.
pub fn parse_blocks<'a>(
    blocks: impl IntoIterator<Item = &'a Block>,
    mode: RenderMode,
) -> Vec<DiaryEntry> {
    let mut parser = EntryParser::new(mode);
    for block in blocks {
        parser.push(block);
    }
    parser.finish()
}

/// `2025-06-22` becomes `6/22`; anything else is kept verbatim.
pub fn display_date(text: &str) -> String {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => format!("{}/{}", date.month(), date.day()),
        Err(_) => text.to_string(),
    }
}

pub fn render_lines(lines: &[String], mode: RenderMode) -> String {
    match mode {
        RenderMode::Plain => lines
            .iter()
            .map(|line| format!("<p class='diary-block'>{}</p>", escape_html(line)))
            .collect::<Vec<_>>()
            .join("\n"),
        RenderMode::Markdown => {
            let source = lines.join("\n");
            let mut out = String::new();
            html::push_html(&mut out, Parser::new_ext(&source, Options::empty()));
            out.trim_end().to_string()
        }
    }
}
