use url::Url;

/// Splits an absolute URL string into its verbatim scheme, authority and the
/// remainder after the authority
///
/// The authority is the text between `://` and the first `/`, `?`, `#` or a backslash,
/// with any `userinfo@` removed. Nothing is case-folded and explicit ports
/// (default or not) are kept as written. Returns None when the input has no
/// `scheme://` prefix or an empty authority.
pub(crate) fn split_authority(url: &str) -> Option<(&str, &str, &str)> {
    let (scheme, rest) = url.split_once(':')?;
    if !looks_like_scheme(scheme) {
        return None;
    }

    let rest = rest.strip_prefix("//")?;
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#' | '\\'))
        .unwrap_or(rest.len());
    let (authority, remainder) = rest.split_at(end);
    let authority = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if authority.is_empty() {
        None
    } else {
        Some((scheme, authority, remainder))
    }
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub(crate) fn looks_like_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Extracts the `host[:port]` authority of an absolute URL exactly as written
///
/// Host case and an explicit port, including a default one such as `:443`, are
/// preserved. If the URL has no authority, returns None.
///
/// # Examples
///
/// ```
/// use nodrift::url::extract_authority;
///
/// assert_eq!(extract_authority("https://Example.com/path"), Some("Example.com"));
/// assert_eq!(extract_authority("http://127.0.0.1:8080/"), Some("127.0.0.1:8080"));
/// assert_eq!(extract_authority("https://example.com:443"), Some("example.com:443"));
/// assert_eq!(extract_authority("mailto:someone@example.com"), None);
/// ```
pub fn extract_authority(url: &str) -> Option<&str> {
    split_authority(url).map(|(_, authority, _)| authority)
}

/// Decides whether `candidate` is on the same domain as `base`
///
/// Only the authority is compared, as an exact string: no case folding and no
/// default-port elision. Scheme and path are ignored and subdomains are distinct
/// domains. A URL that cannot be parsed yields `false` rather than an error, so
/// one bad link never aborts a crawl.
///
/// # Examples
///
/// ```
/// use nodrift::url::same_domain;
///
/// assert!(same_domain("http://example.com", "https://example.com/page"));
/// assert!(!same_domain("https://example.com", "https://sub.example.com/"));
/// assert!(!same_domain("https://example.com", "https://example.com:443/"));
/// assert!(!same_domain("https://example.com", "::not a url::"));
/// ```
pub fn same_domain(base: &str, candidate: &str) -> bool {
    if Url::parse(base).is_err() || Url::parse(candidate).is_err() {
        return false;
    }

    match (extract_authority(base), extract_authority(candidate)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
