//! Utility functions and helpers.

pub mod http;
pub mod log;

use url::{Url, form_urlencoded};

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Percent-encode text so it stays a single URL path segment.
///
/// Reserved characters such as `/`, `#` and `?` are escaped, and the dot
/// segments `.` and `..` are escaped so they cannot climb the path.
pub fn encode_path_segment(segment: &str) -> String {
    if matches!(segment, "." | "..") {
        return segment.replace('.', "%2E");
    }
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
