//! Per-site selector profiles.
//!
//! Each supported retailer gets one entry keyed by a domain keyword. A
//! hostname picks the first profile whose keyword it contains; anything else
//! falls back to the generic (empty) profile.
//!
//! **Update process**: when a site changes its markup, capture a sample page,
//! fix the selectors here and add a fixture test.

use crate::extract::fields::Field;

/// Ordered selector lists for one retailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteProfile {
    /// Substring matched against the hostname
    pub domain_keyword: &'static str,
    /// Human-readable site name
    pub label: &'static str,
    pub name_selectors: &'static [&'static str],
    pub price_selectors: &'static [&'static str],
    pub image_selectors: &'static [&'static str],
}

impl SiteProfile {
    /// The profile used when no registered site matches.
    pub const GENERIC: SiteProfile = SiteProfile {
        domain_keyword: "",
        label: "Generic",
        name_selectors: &[],
        price_selectors: &[],
        image_selectors: &[],
    };

    /// Returns true for the fallback profile.
    pub fn is_generic(&self) -> bool {
        self.domain_keyword.is_empty()
    }

    /// Selectors for the given field, in priority order.
    pub fn selectors(&self, field: Field) -> &'static [&'static str] {
        match field {
            Field::Name => self.name_selectors,
            Field::Price => self.price_selectors,
            Field::Image => self.image_selectors,
        }
    }
}

/// Gaming storefronts get the discount/free price fallback, game metadata
/// and the numeric app-id URL rule.
pub const GAMING_DOMAINS: &[&str] = &[
    "steampowered.com",
    "epicgames.com",
    "gog.com",
    "playstation.com",
    "xbox.com",
    "nintendo.com",
    "humblebundle.com",
    "greenmangaming.com",
];

static PROFILES: &[SiteProfile] = &[
    SiteProfile {
        domain_keyword: "amazon",
        label: "Amazon",
        name_selectors: &["#productTitle", "#title span", ".product-title-word-break"],
        price_selectors: &[
            "#corePrice_feature_div .a-price .a-offscreen",
            "#priceblock_ourprice",
            "#priceblock_dealprice",
            ".a-price .a-offscreen",
        ],
        image_selectors: &["#landingImage", "#imgTagWrapperId img", "#main-image"],
    },
    SiteProfile {
        domain_keyword: "flipkart",
        label: "Flipkart",
        name_selectors: &["span.VU-ZEz", "span.B_NuCI", "h1.yhB1nd"],
        price_selectors: &["div.Nx9bqj.CxhGGd", "div._30jeq3._16Jk6d", "div._30jeq3"],
        image_selectors: &["img.DByuf4", "img._396cs4", "img._2r_T1I"],
    },
    SiteProfile {
        domain_keyword: "myntra",
        label: "Myntra",
        name_selectors: &["h1.pdp-name", "h1.pdp-title"],
        price_selectors: &["span.pdp-price strong", "span.pdp-price"],
        image_selectors: &[".image-grid-image img", ".image-grid-container img"],
    },
    SiteProfile {
        domain_keyword: "ajio",
        label: "AJIO",
        name_selectors: &["h1.prod-name", ".prod-name"],
        price_selectors: &[".prod-sp", ".prod-price-section .prod-sp"],
        image_selectors: &["img.rilrtl-lazy-img", ".zoom-wrap img"],
    },
    SiteProfile {
        domain_keyword: "ebay",
        label: "eBay",
        name_selectors: &[".x-item-title__mainTitle span", "h1#itemTitle", "h1.x-item-title__mainTitle"],
        price_selectors: &[".x-price-primary span", "#prcIsum", "#mm-saleDscPrc"],
        image_selectors: &[".ux-image-carousel-item img", "#icImg"],
    },
    SiteProfile {
        domain_keyword: "walmart",
        label: "Walmart",
        name_selectors: &["h1[itemprop='name']", "h1#main-title"],
        price_selectors: &["span[itemprop='price']", "[data-testid='price-wrap'] span"],
        image_selectors: &["img[data-testid='hero-image']", ".prod-hero-image img"],
    },
    SiteProfile {
        domain_keyword: "bestbuy",
        label: "Best Buy",
        name_selectors: &[".sku-title h1", "h1.heading-5"],
        price_selectors: &[".priceView-customer-price span", "[data-testid='customer-price'] span"],
        image_selectors: &["img.primary-image", ".shop-media-gallery img"],
    },
    SiteProfile {
        domain_keyword: "target",
        label: "Target",
        name_selectors: &["h1[data-test='product-title']"],
        price_selectors: &["[data-test='product-price']"],
        image_selectors: &["[data-test='product-image'] img", "[data-test='image-gallery-item-0'] img"],
    },
    SiteProfile {
        domain_keyword: "etsy",
        label: "Etsy",
        name_selectors: &["h1[data-buy-box-listing-title]", "h1.wt-text-body-01"],
        price_selectors: &["[data-buy-box-region='price'] p.wt-text-title-larger", "[data-buy-box-region='price'] p"],
        image_selectors: &["img[data-index='0']", ".listing-page-image-carousel-component img"],
    },
    SiteProfile {
        domain_keyword: "aliexpress",
        label: "AliExpress",
        name_selectors: &["h1[data-pl='product-title']", ".product-title-text"],
        price_selectors: &[".product-price-current", ".uniform-banner-box-price"],
        image_selectors: &[".magnifier--image--EYYoSlr", ".image-view-magnifier-wrap img"],
    },
    SiteProfile {
        domain_keyword: "newegg",
        label: "Newegg",
        name_selectors: &["h1.product-title"],
        price_selectors: &[".product-price .price-current", "li.price-current"],
        image_selectors: &["img.product-view-img-original"],
    },
    SiteProfile {
        domain_keyword: "ikea",
        label: "IKEA",
        name_selectors: &["h1 .pip-header-section__title--big", ".pip-header-section__title--big"],
        price_selectors: &[".pip-temp-price__integer", ".pip-price__integer"],
        image_selectors: &["img.pip-image"],
    },
    SiteProfile {
        domain_keyword: "steampowered",
        label: "Steam",
        name_selectors: &["#appHubAppName", ".apphub_AppName"],
        price_selectors: &[
            ".game_area_purchase_game .discount_final_price",
            ".game_area_purchase_game .game_purchase_price",
        ],
        image_selectors: &["img.game_header_image_full", "#gameHeaderImageCtn img"],
    },
    SiteProfile {
        domain_keyword: "epicgames",
        label: "Epic Games Store",
        name_selectors: &["h1[data-testid='pdp-title']", "[data-component='PDPTitleHeader'] h1"],
        price_selectors: &[
            "[data-testid='purchase-price-discounted']",
            "[data-component='PDPDiscountedFromPrice'] span",
            "[data-testid='purchase-price']",
        ],
        image_selectors: &["[data-testid='picture-image']", "[data-component='Picture'] img"],
    },
    SiteProfile {
        domain_keyword: "gog.com",
        label: "GOG",
        name_selectors: &["h1.productcard-basics__title"],
        price_selectors: &[".product-actions-price__final-amount", "[selenium-id='ProductFinalPrice']"],
        image_selectors: &[".productcard-player__screenshot img", "img.productcard-player__screenshot"],
    },
    SiteProfile {
        domain_keyword: "playstation",
        label: "PlayStation Store",
        name_selectors: &["[data-qa='mfe-game-title#name']", "h1[data-qa*='title']"],
        price_selectors: &["[data-qa='mfeCtaMain#offer0#finalPrice']", "[data-qa*='finalPrice']"],
        image_selectors: &["[data-qa='gameBackgroundImage#heroImage#image'] img", "img[data-qa*='heroImage']"],
    },
    SiteProfile {
        domain_keyword: "xbox",
        label: "Xbox Store",
        name_selectors: &["h1[class*='ProductDetailsHeader']", "h1.typography-module__xdsH1"],
        price_selectors: &["span[class*='Price-module__boldText']", "span[itemprop='price']"],
        image_selectors: &["img[class*='ProductDetailsHeader']", "section img[class*='ProductImage']"],
    },
    SiteProfile {
        domain_keyword: "nintendo",
        label: "Nintendo eShop",
        name_selectors: &["h1[class*='Title']", ".game-title"],
        price_selectors: &["[class*='Price'] span[class*='price']", ".msrp"],
        image_selectors: &["[class*='hero'] img", ".hero-image img"],
    },
    SiteProfile {
        domain_keyword: "humblebundle",
        label: "Humble Store",
        name_selectors: &["h1.human_name-view", ".product-header-view h1"],
        price_selectors: &[".current-price", ".price-view .price"],
        image_selectors: &["img.large-capsule-image", ".showcase-image img"],
    },
];

/// Returns every registered site profile.
pub fn all() -> &'static [SiteProfile] {
    PROFILES
}

/// Looks up the profile for a hostname. Never fails; unknown hosts get
/// [`SiteProfile::GENERIC`].
pub fn lookup(hostname: &str) -> &'static SiteProfile {
    let host = hostname.to_ascii_lowercase();
    PROFILES
        .iter()
        .find(|profile| host.contains(profile.domain_keyword))
        .unwrap_or(&SiteProfile::GENERIC)
}

/// Returns true if some registered profile matches the hostname.
pub fn is_supported(hostname: &str) -> bool {
    !lookup(hostname).is_generic()
}

/// Returns true for the fixed set of gaming storefront domains.
pub fn is_gaming_domain(hostname: &str) -> bool {
    let host = hostname.to_ascii_lowercase();
    GAMING_DOMAINS.iter().any(|domain| host.contains(domain))
}

/// Lowercases a hostname and strips a leading `www.`.
pub fn bare_domain(hostname: &str) -> String {
    let host = hostname.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}
