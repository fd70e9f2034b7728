//! Image URL resolution.

use url::Url;

/// Makes an image URL absolute.
///
/// URLs that already carry a scheme are returned unchanged. Relative and
/// protocol-relative URLs are resolved against the page origin. If resolution
/// fails the candidate is returned as-is.
pub fn resolve(candidate: &str, page_url: &Url) -> String {
    let candidate = candidate.trim();
    if candidate.is_empty() || has_scheme(candidate) {
        return candidate.to_string();
    }

    let origin = page_url.origin().ascii_serialization();
    Url::parse(&origin)
        .and_then(|base| base.join(candidate))
        .map(String::from)
        .unwrap_or_else(|_| candidate.to_string())
}

fn has_scheme(candidate: &str) -> bool {
    Url::parse(candidate).is_ok()
}

/// Returns true for inline placeholders (`data:` URIs) that lazy loaders
/// swap out later.
pub fn is_placeholder(candidate: &str) -> bool {
    candidate.trim_start().to_ascii_lowercase().starts_with("data:")
}
