//! HTML parser for extracting the page title and outgoing links
//!
//! Extraction happens once, when the page is parsed. The resulting
//! [`HtmlDocument`] owns plain strings, so it can be handed between tasks
//! while `scraper::Html` itself cannot.

use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;

/// A fetched page, as seen by the crawl engine
///
/// Both accessors return empty values when the run has already been
/// cancelled, so that a shutting-down crawl does not fan out further.
pub trait Document: Send + Sync {
    /// Text of the first `<title>` element, or an empty string
    fn title(&self, cancel: &CancellationToken) -> String;

    /// Raw `href` values of every `<a>` element, in document order
    ///
    /// Values are not resolved against the page URL and not deduplicated.
    fn links(&self, cancel: &CancellationToken) -> Vec<String>;
}

/// Title and links extracted from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    title: String,
    links: Vec<String>,
}

impl HtmlDocument {
    /// Builds a document from already-extracted parts
    pub fn new(title: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            title: title.into(),
            links,
        }
    }
}

impl Document for HtmlDocument {
    fn title(&self, cancel: &CancellationToken) -> String {
        if cancel.is_cancelled() {
            tracing::debug!("Run cancelled, skipping title extraction");
            return String::new();
        }
        self.title.clone()
    }

    fn links(&self, cancel: &CancellationToken) -> Vec<String> {
        if cancel.is_cancelled() {
            tracing::debug!("Run cancelled, skipping link extraction");
            return Vec::new();
        }
        self.links.clone()
    }
}

/// Parses HTML content and extracts the title and anchor links
///
/// # Extraction Rules
///
/// - Title: text of the first `<title>` element, trimmed; empty if absent
/// - Links: the `href` attribute of every `<a>` element that has one, verbatim,
///   in document order. Relative links, fragments and `mailto:` links are
///   kept as-is; the crawler's scheme guard filters them later.
///
/// # Example
///
/// ```
/// use sumi_scan::crawler::{parse_html, Document};
/// use tokio_util::sync::CancellationToken;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let doc = parse_html(html);
/// let cancel = CancellationToken::new();
/// assert_eq!(doc.title(&cancel), "Test");
/// assert_eq!(doc.links(&cancel), vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> HtmlDocument {
    let document = Html::parse_document(html);

    HtmlDocument {
        title: extract_title(&document),
        links: extract_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the raw `href` of every anchor in the HTML document
fn extract_links(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
