//! HTML parser for extracting links
//!
//! This module handles parsing a loaded page to extract:
//! - Navigational links (`<a href>`, `<area href>`)
//! - Inline resource links (images, scripts, stylesheets, frames, media)
//!
//! Both lists are resolved to absolute URLs against the document's `<base href>`
//! when it has one, otherwise against the URL the page was loaded from.

use scraper::{Html, Selector};
use url::Url;

/// Navigational link selectors and the attribute holding the target
const NAV_SELECTORS: &[(&str, &str)] = &[("a[href]", "href"), ("area[href]", "href")];

/// Inline resource selectors and the attribute holding the target
const INLINE_SELECTORS: &[(&str, &str)] = &[
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("link[rel~='stylesheet'][href]", "href"),
    ("link[rel~='icon'][href]", "href"),
    ("iframe[src]", "src"),
    ("frame[src]", "src"),
    ("embed[src]", "src"),
    ("source[src]", "src"),
    ("video[src]", "src"),
    ("audio[src]", "src"),
    ("track[src]", "src"),
    ("object[data]", "data"),
    ("input[type='image'][src]", "src"),
];

/// Links found on one page, absolute, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Hyperlink targets
    pub nav: Vec<String>,

    /// Embedded resource targets
    pub inline: Vec<String>,
}

/// Parses HTML content and extracts navigational and inline links
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that is not HTTP(S) after resolution
///
/// Fragments are kept on the returned URLs; the scheduler normalizes them.
///
/// # Example
///
/// ```
/// use site_spider::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a><img src="logo.png"></body></html>"#;
/// let page_url = Url::parse("https://example.com/docs/").unwrap();
/// let links = extract_links(html, &page_url);
/// assert_eq!(links.nav, vec!["https://example.com/page".to_string()]);
/// assert_eq!(links.inline, vec!["https://example.com/docs/logo.png".to_string()]);
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> PageLinks {
    let document = Html::parse_document(html);
    let base_url = document_base(&document, page_url);

    PageLinks {
        nav: collect(&document, &base_url, NAV_SELECTORS),
        inline: collect(&document, &base_url, INLINE_SELECTORS),
    }
}

/// Returns the URL relative links resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    let Ok(selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

fn collect(document: &Html, base_url: &Url, selectors: &[(&str, &str)]) -> Vec<String> {
    let mut links = Vec::new();

    for (css, attr) in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(target) = element.value().attr(attr) {
                if let Some(absolute_url) = resolve_link(target, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link target to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
