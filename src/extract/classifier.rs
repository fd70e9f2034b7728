//! Heuristic product-page URL detection.

use crate::extract::sites;
use regex_lite::Regex;
use std::sync::LazyLock;
use url::Url;

/// Path fragments that usually mean a product page.
const PRODUCT_PATTERNS: &[&str] =
    &["/product/", "/products/", "/dp/", "/gp/product/", "/item/", "/itm/", "/pd/", "/p/", "/buy/", "/detail/"];

/// Path fragments used by game storefronts.
const GAMING_PATTERNS: &[&str] = &["/app/", "/game/", "/games/", "/store/products/", "/store/games/"];

/// A run of five or more uppercase letters or digits (ASINs, SKUs).
static PRODUCT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z0-9]{5,}").unwrap());

/// Steam-style numeric store ids for apps, packages and bundles:
/// `/sub/469`, `/bundle/232`. Only trusted on gaming hosts.
static NUMERIC_STORE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:app|sub|bundle)/\d+").unwrap());

/// Returns true if the URL looks like a product page.
///
/// Known sites are judged leniently (any deep path passes); unknown sites
/// need a product path pattern or a product id. Malformed URLs are `false`.
pub fn is_likely_product_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let domain = sites::bare_domain(host);
    let path = parsed.path();

    let is_supported_site = sites::is_supported(&domain);
    let pattern_match = matches_pattern(path) || (sites::is_gaming_domain(&domain) && NUMERIC_STORE_ID.is_match(path));
    let has_product_id = has_product_id(path);

    if is_supported_site {
        pattern_match || has_product_id || segment_count(path) > 2
    } else {
        pattern_match || has_product_id
    }
}

fn matches_pattern(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    // Allow patterns to match a trailing segment without its closing slash.
    let lower = if lower.ends_with('/') { lower } else { format!("{}/", lower) };

    PRODUCT_PATTERNS.iter().chain(GAMING_PATTERNS).any(|pattern| lower.contains(pattern))
}

fn has_product_id(path: &str) -> bool {
    path.split('/').any(|segment| PRODUCT_ID.is_match(segment))
}

fn segment_count(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}
