use super::domain::split_authority;
use crate::UrlError;
use serde::Serialize;
use std::fmt;
use url::Url;

/// A URL in canonical form: `scheme://host[:port]path`
///
/// Query string, fragment, userinfo and trailing slashes are removed. Two URLs
/// denote the same page iff their canonical strings are byte-equal. The only way
/// to obtain a `CanonicalUrl` is through [`normalize_url`], so every value of this
/// type upholds the canonical-form invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the canonical string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the scheme as written
    pub fn scheme(&self) -> &str {
        split_authority(&self.0).map_or("", |(scheme, _, _)| scheme)
    }

    /// Returns the `host[:port]` authority as written
    pub fn authority(&self) -> &str {
        split_authority(&self.0).map_or("", |(_, authority, _)| authority)
    }

    /// Parses the canonical string back into a `Url` for requests and joins
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::MalformedUrl(format!("{}: {}", self.0, e)))
    }

    /// Consumes the wrapper and returns the canonical string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalUrl {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalUrl {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Normalizes an absolute URL into its canonical form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if it has no scheme or no host
/// 2. Keep the scheme and the `host[:port]` authority exactly as written
/// 3. Keep the path, minus any trailing slashes
/// 4. Drop userinfo, query string and fragment
///
/// Scheme and authority are never case-folded and an explicit port stays even
/// when it is the scheme's default. The path goes through the parser's
/// syntactic normalization (dot segments, percent encoding) but keeps its case.
///
/// # Arguments
///
/// * `url_str` - The absolute URL string to normalize
///
/// # Returns
///
/// * `Ok(CanonicalUrl)` - Canonical URL
/// * `Err(UrlError::MalformedUrl)` - The input has no parseable scheme and host
///
/// # Examples
///
/// ```
/// use nodrift::url::normalize_url;
///
/// let url = normalize_url("https://example.com/page/?q=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
///
/// let url = normalize_url("https://Example.COM:443/Path/").unwrap();
/// assert_eq!(url.as_str(), "https://Example.COM:443/Path");
/// ```
pub fn normalize_url(url_str: &str) -> Result<CanonicalUrl, UrlError> {
    let url_str = url_str.trim();
    let url = Url::parse(url_str).map_err(|e| UrlError::MalformedUrl(format!("{}: {}", url_str, e)))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MalformedUrl(format!("{}: missing host", url_str)));
    }

    let (scheme, authority, _) = split_authority(url_str)
        .ok_or_else(|| UrlError::MalformedUrl(format!("{}: missing authority", url_str)))?;

    let path = url.path().trim_end_matches('/');

    Ok(CanonicalUrl(format!("{}://{}{}", scheme, authority, path)))
}
