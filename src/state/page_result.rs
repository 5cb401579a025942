use crate::url::CanonicalUrl;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Immutable record of one successfully processed page
///
/// Created once per crawled page and never mutated afterward; fields are only
/// readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    url: CanonicalUrl,
    links: Vec<CanonicalUrl>,
    fetched_at: DateTime<Utc>,
    status: u16,
}

impl PageResult {
    /// Creates a page record; links are stored sorted and deduplicated
    pub fn new(url: CanonicalUrl, mut links: Vec<CanonicalUrl>, status: u16) -> Self {
        links.sort();
        links.dedup();

        Self {
            url,
            links,
            fetched_at: Utc::now(),
            status,
        }
    }

    /// The canonical URL of the page
    pub fn url(&self) -> &CanonicalUrl {
        &self.url
    }

    /// Same-domain links found on the page, sorted
    pub fn links(&self) -> &[CanonicalUrl] {
        &self.links
    }

    /// When the page was fetched
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// HTTP status of the response
    pub fn status(&self) -> u16 {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_url;

    #[test]
    fn test_links_sorted_and_deduplicated() {
        let page = PageResult::new(
            normalize_url("https://example.com").unwrap(),
            vec![
                normalize_url("https://example.com/b").unwrap(),
                normalize_url("https://example.com/a").unwrap(),
                normalize_url("https://example.com/b/").unwrap(),
            ],
            200,
        );

        let links: Vec<&str> = page.links().iter().map(|l| l.as_str()).collect();
        assert_eq!(links, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(page.status(), 200);
        assert_eq!(page.url().as_str(), "https://example.com");
    }

    #[test]
    fn test_serializes_urls_as_strings() {
        let page = PageResult::new(normalize_url("https://example.com/x").unwrap(), vec![], 200);
        let rendered = toml::to_string(&page).unwrap();
        assert!(rendered.contains("url = \"https://example.com/x\""));
        assert!(rendered.contains("status = 200"));
    }
}
