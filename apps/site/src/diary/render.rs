use crate::diary::models::{escape_html, DiaryEntry};

/// Renders the diary page shell. Entry HTML is already rendered and trusted;
/// dates are escaped.
pub fn render_page(entries: &[DiaryEntry], page: u32, total_pages: u32) -> String {
    let mut body = String::new();
    for entry in entries {
        body.push_str(&format!(
            "<section class='diary-entry'>\n<h2 class='diary-date'>{}</h2>\n{}\n</section>\n",
            escape_html(&entry.date),
            entry.html
        ));
    }

    let mut nav = String::new();
    if total_pages > 1 {
        nav.push_str("<nav class='diary-pages'>");
        for n in 1..=total_pages {
            let href = if n == 1 { "/".to_string() } else { format!("/page{n}") };
            if n == page {
                nav.push_str(&format!("<span class='current'>{n}</span>"));
            } else {
                nav.push_str(&format!("<a href='{href}'>{n}</a>"));
            }
        }
        nav.push_str("</nav>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang='ja'>\n<head>\n<meta charset='utf-8'>\n<title>Diary</title>\n</head>\n<body>\n<main class='diary'>\n{body}</main>\n{nav}</body>\n</html>\n"
    )
}
