use serde::Serialize;

/// One dated diary item, rendered to HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaryEntry {
    pub date: String,
    pub html: String,
}

impl DiaryEntry {
    /// A visible in-page entry used in place of content that could not be loaded.
    pub fn error(message: impl Into<String>) -> Self {
        DiaryEntry {
            date: "Error".to_string(),
            html: format!(
                "<p class='diary-block diary-error'>{}</p>",
                escape_html(&message.into())
            ),
        }
    }
}

/// One unit of remote document content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Heading text runs; the first run carries the date.
    Heading(Vec<String>),
    Paragraph(Vec<String>),
    Other,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a <b> & 'c'"), "a &lt;b&gt; &amp; &#39;c&#39;");
    }

    #[test]
    fn test_error_entry_is_escaped() {
        let entry = DiaryEntry::error("bad <page>");
        assert_eq!(entry.date, "Error");
        assert!(entry.html.contains("bad &lt;page&gt;"));
    }
}
