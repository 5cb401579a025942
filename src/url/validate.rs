use super::domain::looks_like_scheme;
use crate::UrlError;
use url::{Host, Url};

const DEFAULT_SCHEME: &str = "https://";

/// Completes and validates a user-entered seed URL
///
/// # Rules
///
/// 1. Empty or whitespace-only input is rejected with `EmptyInput`
/// 2. Input without a scheme gets `https://` prepended; an explicit scheme
///    other than http/https is rejected with `MalformedUrl`
/// 3. Repeated `www.` prefixes collapse to one
/// 4. The host must be present and look like a domain name (dot-separated
///    labels ending in an alphabetic top-level domain of at least two
///    characters), an IP literal, or `localhost`; otherwise `InvalidDomain`
///
/// Path, query and fragment of the input are kept as typed. No network access
/// is performed.
///
/// # Examples
///
/// ```
/// use nodrift::url::complete_and_validate;
///
/// assert_eq!(complete_and_validate("example.com").unwrap(), "https://example.com");
/// assert_eq!(
///     complete_and_validate("https://example.com").unwrap(),
///     "https://example.com"
/// );
/// assert!(complete_and_validate("not a url").is_err());
/// ```
pub fn complete_and_validate(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::EmptyInput);
    }

    let (scheme, rest) = match trimmed.find("://").filter(|&idx| looks_like_scheme(&trimmed[..idx])) {
        Some(idx) => {
            let scheme = &trimmed[..idx];
            if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
                return Err(UrlError::MalformedUrl(format!(
                    "unsupported scheme '{}' in '{}'",
                    scheme, trimmed
                )));
            }
            (&trimmed[..idx + 3], &trimmed[idx + 3..])
        }
        None => (DEFAULT_SCHEME, trimmed),
    };

    let completed = format!("{}{}", scheme, collapse_www(rest));

    let url = Url::parse(&completed).map_err(|e| UrlError::InvalidDomain(format!("'{}': {}", trimmed, e)))?;

    match url.host() {
        Some(Host::Domain(domain)) if is_valid_domain(domain) => Ok(completed),
        Some(Host::Domain(domain)) => Err(UrlError::InvalidDomain(domain.to_string())),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(completed),
        None => Err(UrlError::InvalidDomain(format!("'{}': missing host", trimmed))),
    }
}

/// Collapses `www.www.` prefixes to a single `www.`
fn collapse_www(rest: &str) -> &str {
    let mut rest = rest;
    while rest
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www.www."))
    {
        rest = &rest[4..];
    }
    rest
}

/// Checks a host against the domain-name shape
fn is_valid_domain(domain: &str) -> bool {
    if domain.eq_ignore_ascii_case("localhost") {
        return true;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let Some((tld, names)) = labels.split_last() else {
        return false;
    };

    names.iter().all(|label| is_valid_label(label)) && is_valid_tld(tld)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_tld(tld: &str) -> bool {
    if tld.len() < 2 {
        return false;
    }

    // punycode TLDs, e.g. xn--p1ai
    if tld.starts_with("xn--") {
        return is_valid_label(tld);
    }

    tld.chars().all(|c| c.is_ascii_alphabetic())
}
