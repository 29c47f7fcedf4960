//! HTML to plain text for web sources.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text never belongs to the page content.
const SKIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "template", "svg", "nav", "footer", "head",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
}

pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(|el| clean_text(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty());

    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    collect_text(root, &mut lines);

    ExtractedPage {
        title,
        text: lines.join("\n"),
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let cleaned = clean_text(text);
                if !cleaned.is_empty() {
                    out.push(cleaned);
                }
            }
            Node::Element(el) => {
                if SKIPPED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_visible_text() {
        let html = r#"
            <html>
            <head><title> LLM Powered Agents </title><style>body { color: red; }</style></head>
            <body>
                <nav>Home | Posts</nav>
                <script>var tracking = 1;</script>
                <h1>Agent System Overview</h1>
                <p>Planning,   memory and
                   tool use.</p>
                <footer>Copyright</footer>
            </body>
            </html>
        "#;

        let page = extract_page(html);

        assert_eq!(page.title.as_deref(), Some("LLM Powered Agents"));
        assert_eq!(page.text, "Agent System Overview\nPlanning, memory and tool use.");
    }

    #[test]
    fn fragments_without_body_still_yield_text() {
        let page = extract_page("<p>Just text</p>");
        assert_eq!(page.text, "Just text");
        assert_eq!(page.title, None);
    }
}
