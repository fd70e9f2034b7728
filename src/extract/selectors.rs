//! Site-independent CSS selectors.
//!
//! Site-specific tables live in [`sites`](crate::extract::sites); this file
//! holds the generic fallback chain, metadata tags, and the gaming price
//! selectors shared by every storefront.

use scraper::Selector;
use std::sync::LazyLock;

/// Embedded JSON-LD blocks.
pub static STRUCTURED_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type='application/ld+json']").unwrap());

/// Generic selectors tried after the site profile, in order.
pub mod generic {
    pub static NAME: &[&str] = &[
        "h1[itemprop='name']",
        "[itemprop='name']",
        ".product-title",
        ".product-name",
        ".product_title",
        "#product-title",
        "h1",
    ];

    pub static PRICE: &[&str] = &[
        "[itemprop='price']",
        ".sale-price",
        ".current-price",
        ".product-price",
        ".price--current",
        ".price-current",
        "[data-price]",
        ".price",
    ];

    pub static IMAGE: &[&str] = &[
        "img[itemprop='image']",
        ".product-image img",
        ".product-gallery img",
        "#main-image",
        "img.main-image",
        ".gallery img",
        "img[src*='product']",
    ];
}

/// Metadata tags. The value lives in the attribute named alongside each
/// selector.
pub mod meta {
    pub static NAME: &[(&str, &str)] = &[
        ("meta[property='og:title']", "content"),
        ("meta[name='twitter:title']", "content"),
    ];

    pub static PRICE: &[(&str, &str)] = &[
        ("meta[property='og:price:amount']", "content"),
        ("meta[property='product:price:amount']", "content"),
        ("meta[itemprop='price']", "content"),
    ];

    pub static IMAGE: &[(&str, &str)] = &[
        ("meta[property='og:image']", "content"),
        ("meta[property='og:image:secure_url']", "content"),
        ("meta[name='twitter:image']", "content"),
        ("link[rel='image_src']", "href"),
    ];

    pub static DESCRIPTION: &[(&str, &str)] = &[
        ("meta[name='description']", "content"),
        ("meta[property='og:description']", "content"),
        ("meta[name='twitter:description']", "content"),
    ];
}

/// Price selectors for gaming storefronts. Discounted prices come first so a
/// sale price beats the struck-through original.
pub mod gaming {
    pub static DISCOUNT_PRICE: &[&str] = &[
        ".discount_final_price",
        ".game_purchase_discount .discount_final_price",
        "[data-testid='purchase-price-discounted']",
        "[data-qa*='finalPrice']",
        ".product-actions-price__final-amount",
        ".price-discounted",
        ".sale-price",
    ];

    pub static PRICE: &[&str] = &[
        ".game_purchase_price",
        "[data-testid='purchase-price']",
        ".price",
        ".game-price",
        ".current-price",
    ];
}

/// Attributes that may carry an image URL, checked in this order.
pub static IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-original", "data-lazy-src"];
