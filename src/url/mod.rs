//! URL handling module for Sumi-Scan
//!
//! The crawler deliberately does no canonicalization: links are compared as
//! the raw strings found in `href` attributes. The only check applied is the
//! scheme prefix.

/// Schemes the crawler is willing to fetch
pub const CRAWLABLE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Returns true if the URL begins with `http://` or `https://`
///
/// The comparison is a case-sensitive prefix match on the raw string.
/// Relative links, fragments, `mailto:` and friends all fail it.
///
/// # Examples
///
/// ```
/// use sumi_scan::url::has_crawlable_scheme;
///
/// assert!(has_crawlable_scheme("https://example.com"));
/// assert!(!has_crawlable_scheme("/about"));
/// ```
pub fn has_crawlable_scheme(url: &str) -> bool {
    CRAWLABLE_SCHEMES
        .iter()
        .any(|scheme| url.starts_with(scheme))
}
