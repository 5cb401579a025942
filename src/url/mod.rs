//! URL handling module for Nodrift
//!
//! This module provides seed completion and validation, canonicalization of
//! URLs, and same-domain scoping.

mod domain;
mod normalize;
mod validate;

// Re-export main functions
pub use domain::{extract_authority, same_domain};
pub use normalize::{normalize_url, CanonicalUrl};
pub use validate::complete_and_validate;

use crate::UrlError;

/// Completes, validates and canonicalizes a user-entered seed
///
/// This is the full seed pipeline used before a crawl is started: the raw input
/// goes through [`complete_and_validate`] and then [`normalize_url`].
///
/// # Examples
///
/// ```
/// use nodrift::url::prepare_seed;
///
/// let seed = prepare_seed("www.example.com/docs/").unwrap();
/// assert_eq!(seed.as_str(), "https://www.example.com/docs");
/// ```
pub fn prepare_seed(raw: &str) -> Result<CanonicalUrl, UrlError> {
    let completed = complete_and_validate(raw)?;
    normalize_url(&completed)
}
