//! HTML parser for extracting links and page metadata
//!
//! This module turns a fetched page into everything the index needs:
//! - Outbound links restricted to the configured link prefix
//! - Page title, date and size
//! - The visible body text, tokenized

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::FetchedPage;
use crate::index::tokenize;
use crate::ConfigError;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref BODY: Selector = Selector::parse("html > body").expect("valid selector");
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("valid selector");
    static ref DATE_RE: Regex = Regex::new(r"[0-9-]+").expect("valid regex");
}

/// Site-specific rules applied to every parsed page
#[derive(Debug, Clone)]
pub struct PageRules {
    link_prefix: String,
    base: Url,
    date_selector: Selector,
}

impl PageRules {
    pub fn new(link_prefix: &str, date_selector: &str) -> Result<Self, ConfigError> {
        // relative hrefs resolve under the prefix directory
        let base_text = if link_prefix.ends_with('/') {
            link_prefix.to_string()
        } else {
            format!("{}/", link_prefix)
        };
        let base = Url::parse(&base_text)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid link-prefix: {}", e)))?;
        let date_selector = Selector::parse(date_selector).map_err(|_| {
            ConfigError::Validation(format!(
                "date-selector '{}' is not a valid CSS selector",
                date_selector
            ))
        })?;

        Ok(Self {
            link_prefix: link_prefix.to_string(),
            base,
            date_selector,
        })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, ConfigError> {
        Self::new(&config.link_prefix, &config.date_selector)
    }
}

/// Everything extracted from one fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    /// The URL the page was requested under
    pub url: String,

    /// Page title, or the URL when the page has none
    pub title: String,

    pub date: String,

    /// Content-Length, or the visible text length without it
    ///
    /// Compressed responses carry no usable Content-Length once decoded, so
    /// they always take the fallback.
    pub size: u64,

    /// Lowercase tokens of the visible text, unstemmed
    pub tokens: Vec<String>,

    /// Outbound links under the link prefix, in document order
    pub links: Vec<String>,
}

/// Parses a fetched page
///
/// # Extraction Rules
///
/// | Field | Source | Fallback |
/// |-------|--------|----------|
/// | title | `<title>` text, trimmed | the URL |
/// | date | first `[0-9-]+` run in the date selector's text | `Last-Modified`, then `Date`, then now |
/// | size | `Content-Length` header | visible text length |
/// | tokens | visible text of `html > body`, scripts and styles removed | none |
///
/// A malformed or empty body still parses; it yields a page with no tokens.
pub fn parse_page(page: &FetchedPage, rules: &PageRules) -> ParsedPage {
    let document = Html::parse_document(&page.body);
    let text = visible_text(&document);

    let title = extract_title(&document).unwrap_or_else(|| page.url.clone());
    let date = extract_date(
        &document,
        rules,
        page.last_modified.as_deref(),
        page.date_header.as_deref(),
    );
    let size = page
        .content_length
        .unwrap_or_else(|| text.trim().chars().count() as u64);

    ParsedPage {
        url: page.url.clone(),
        title,
        date,
        size,
        tokens: tokenize(&text),
        links: extract_links(&document, rules),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title: String = document
        .select(&TITLE)
        .flat_map(|element| element.text())
        .collect();
    let title = title.trim();

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Determines the page date
///
/// The first `,` of the result is replaced by a space, so HTTP dates such as
/// `Tue, 07 Feb 2023 09:00:00 GMT` are stored as `Tue  07 Feb 2023 09:00:00 GMT`.
pub fn extract_date(
    document: &Html,
    rules: &PageRules,
    last_modified: Option<&str>,
    date_header: Option<&str>,
) -> String {
    let marker: String = document
        .select(&rules.date_selector)
        .flat_map(|element| element.text())
        .collect();

    let date = DATE_RE
        .find(&marker)
        .map(|m| m.as_str().to_string())
        .or_else(|| last_modified.map(str::to_string))
        .or_else(|| date_header.map(str::to_string))
        .unwrap_or_else(|| {
            chrono::Utc::now()
                .format("%a, %d %b %Y %H:%M:%S GMT")
                .to_string()
        });

    date.replacen(',', " ", 1)
}

/// Concatenated text of `html > body`, excluding script and style contents
///
/// Falls back to the whole document when there is no body element.
pub fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    collect_text(root)
}

fn collect_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in root.descendants() {
        if let Node::Text(fragment) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |e| matches!(e.name(), "script" | "style"))
            });
            if !hidden {
                text.push_str(fragment);
            }
        }
    }

    text
}

/// Extracts all valid links from the HTML document
///
/// Links keep document order and duplicates; deduplication belongs to
/// discovery.
pub fn extract_links(document: &Html, rules: &PageRules) -> Vec<String> {
    document
        .select(&ANCHOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, rules))
        .collect()
}

/// Resolves a link href against the link prefix and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs and fragment-only hrefs
/// - Invalid URLs
/// - URLs outside the link prefix
pub fn resolve_link(href: &str, rules: &PageRules) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = if lower.starts_with("http://") || lower.starts_with("https://") {
        href.to_string()
    } else {
        rules.base.join(href).ok()?.to_string()
    };

    if !absolute.starts_with(&rules.link_prefix) {
        return None;
    }

    Some(canonical_url(&absolute))
}

/// Strips one trailing `/`
pub fn canonical_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}
