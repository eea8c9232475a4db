//! Word counting over editor HTML
//!
//! Section content arrives as HTML from the rich-text editor. Thresholds are
//! expressed in words of the rendered text, so markup is stripped first.

use scraper::{Html, Node};

/// Elements whose boundaries separate words
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose text content is never rendered
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Convert editor HTML to plain text
///
/// Text nodes are kept in document order, link targets and images are dropped
/// and block boundaries become newlines. Entities are decoded by the parser.
pub fn html_to_plain_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());

    for node in fragment.tree.root().descendants() {
        match node.value() {
            Node::Element(element) => {
                if BLOCK_ELEMENTS.contains(&element.name()) && !out.ends_with('\n') && !out.is_empty() {
                    out.push('\n');
                }
            }
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                        .unwrap_or(false)
                });
                if !hidden {
                    out.push_str(text);
                }
            }
            _ => {}
        }
    }

    out.trim().to_string()
}

/// Count whitespace-separated words in plain text
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count words in editor HTML
pub fn word_count_html(html: &str) -> usize {
    if html.trim().is_empty() {
        return 0;
    }
    word_count(&html_to_plain_text(html))
}

/// Count characters (Unicode scalar values)
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
