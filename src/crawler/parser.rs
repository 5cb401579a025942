//! HTML parser for extracting same-domain links
//!
//! Anchors are resolved against the page URL with standard relative-URL
//! resolution, canonicalized, and scoped to the page's authority as written.
//! Anything that is not an http(s) link to the same authority is dropped
//! silently.

use crate::url::{extract_authority, normalize_url, CanonicalUrl};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the distinct same-domain links of an HTML page
///
/// Links are returned in first-discovery order; callers that need
/// deterministic output regardless of markup order must sort.
///
/// A relative href inherits the scheme and authority of `base_url` as written;
/// an absolute href keeps its own. The authority must then match the page's
/// exactly.
///
/// # Arguments
///
/// * `base_url` - The URL the page was fetched from
/// * `html` - The HTML content to parse
///
/// # Example
///
/// ```
/// use nodrift::crawler::extract_links;
///
/// let html = r#"<a href="/a">A</a><a href="https://other.com/">B</a>"#;
/// let links = extract_links("https://example.com/", html);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/a");
/// ```
pub fn extract_links(base_url: &str, html: &str) -> Vec<CanonicalUrl> {
    let Some(base) = PageBase::new(base_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(link) = base.resolve(href) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

/// The page URL in parsed form plus its scheme and authority as written
struct PageBase<'a> {
    parsed: Url,
    scheme: &'a str,
    authority: &'a str,
}

impl<'a> PageBase<'a> {
    fn new(base_url: &'a str) -> Option<Self> {
        let base_url = base_url.trim();
        let parsed = Url::parse(base_url).ok()?;
        let (scheme, _) = base_url.split_once("://")?;
        let authority = extract_authority(base_url)?;

        Some(Self {
            parsed,
            scheme,
            authority,
        })
    }

    /// Resolves one href to a canonical same-domain URL
    ///
    /// Returns None for empty hrefs, unparseable links, non-http(s) schemes
    /// (`mailto:`, `javascript:`, `tel:`, `data:`) and other authorities.
    fn resolve(&self, href: &str) -> Option<CanonicalUrl> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let resolved = self.parsed.join(href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }

        let link = if let Some(network_path) = href.strip_prefix("//") {
            normalize_url(&format!("{}://{}", self.scheme, network_path)).ok()?
        } else if extract_authority(href).is_some() {
            normalize_url(href).ok()?
        } else {
            normalize_url(&format!("{}://{}{}", self.scheme, self.authority, resolved.path())).ok()?
        };

        (link.authority() == self.authority).then_some(link)
    }
}
