//! Free-form price text normalization.

use crate::extract::selectors::gaming;
use regex_lite::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, trace};

/// First numeric run, optionally prefixed by a currency symbol.
static PRICE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[$€£¥₹₩₽₱₺฿]\s*)?\d[\d,]*(?:\.\d+)?").unwrap()
});

/// Explicit zero prices like "$0" or "0.00", without matching "$10.00".
static ZERO_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9.,])0\.00(?:$|[^0-9])|\$0(?:$|[^0-9.,])").unwrap()
});

/// Leading currency symbols and their ISO codes.
const CURRENCY_SYMBOLS: &[(char, &str)] = &[
    ('$', "USD"),
    ('€', "EUR"),
    ('£', "GBP"),
    ('¥', "JPY"),
    ('₹', "INR"),
    ('₩', "KRW"),
    ('₽', "RUB"),
    ('₱', "PHP"),
    ('₺', "TRY"),
    ('฿', "THB"),
];

/// Parses the first numeric run in `text` into a number.
///
/// Commas are treated as thousands separators: `"₹1,234.50"` becomes
/// `1234.5`. Returns `None` when the text contains no digits.
pub fn parse_price(text: &str) -> Option<f64> {
    let matched = PRICE_RUN.find(text)?.as_str();

    let cleaned: String =
        matched.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    let value = cleaned.parse::<f64>().ok()?;
    if let Some(currency) = detect_currency(text) {
        trace!("Parsed {} {} from {:?}", currency, value, text);
    }
    Some(value)
}

/// Returns the ISO code of the first currency symbol found before the
/// amount, if any.
pub fn detect_currency(text: &str) -> Option<&'static str> {
    text.chars()
        .take_while(|c| !c.is_ascii_digit())
        .find_map(|c| CURRENCY_SYMBOLS.iter().find(|(symbol, _)| *symbol == c).map(|(_, code)| *code))
}

/// Returns true for text that advertises a zero price ("Free to Play",
/// "$0", "0.00").
pub fn is_free(text: &str) -> bool {
    text.to_lowercase().contains("free") || ZERO_PRICE.is_match(text)
}

/// Price fallback for gaming storefronts.
///
/// Discount selectors are searched before regular price selectors, so a sale
/// price wins over the original. Free games resolve to `0`.
pub fn gaming_price(document: &Html) -> Option<f64> {
    for selector in gaming::DISCOUNT_PRICE.iter().chain(gaming::PRICE) {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&parsed) {
            let text = element.text().collect::<String>();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            if is_free(text) {
                debug!("Gaming price via {} is free: {:?}", selector, text);
                return Some(0.0);
            }

            if let Some(value) = parse_price(text) {
                debug!("Gaming price via {}: {}", selector, value);
                return Some(value);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_symbols() {
        assert_eq!(parse_price("₹1,234.50"), Some(1234.5));
        assert_eq!(parse_price("$29.99"), Some(29.99));
        assert_eq!(parse_price("£ 1,299"), Some(1299.0));
        assert_eq!(parse_price("€49"), Some(49.0));
        assert_eq!(parse_price("29.99"), Some(29.99));
    }

    #[test]
    fn test_parse_price_zero() {
        assert_eq!(parse_price("$0.00"), Some(0.0));
        assert_eq!(parse_price("0"), Some(0.0));
    }

    #[test]
    fn test_parse_price_embedded_in_text() {
        assert_eq!(parse_price("Now only $19.99!"), Some(19.99));
        assert_eq!(parse_price("Price: 1,999 (incl. tax)"), Some(1999.0));
        assert_eq!(parse_price("  \n $5.49 \n "), Some(5.49));
    }

    #[test]
    fn test_parse_price_first_run_wins() {
        assert_eq!(parse_price("$10 - $20"), Some(10.0));
    }

    #[test]
    fn test_parse_price_no_digits() {
        assert_eq!(parse_price("no digits here"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price(", ,"), None);
    }

    #[test]
    fn test_detect_currency() {
        assert_eq!(detect_currency("₹1,234.50"), Some("INR"));
        assert_eq!(detect_currency("Price: €12"), Some("EUR"));
        assert_eq!(detect_currency("12 €"), None);
        assert_eq!(detect_currency("1234"), None);
    }

    #[test]
    fn test_is_free() {
        assert!(is_free("Free to Play"));
        assert!(is_free("FREE"));
        assert!(is_free("$0"));
        assert!(is_free("$0.00"));
        assert!(is_free("0.00"));
        assert!(!is_free("$10.00"));
        assert!(!is_free("$0.99"));
        assert!(!is_free("$59.99"));
    }

    #[test]
    fn test_gaming_price_prefers_discount() {
        let html = Html::parse_document(
            r#"<div class="game_purchase_action">
                <div class="discount_original_price">$59.99</div>
                <div class="discount_final_price">$29.99</div>
            </div>
            <div class="game_purchase_price price">$59.99</div>"#,
        );
        assert_eq!(gaming_price(&html), Some(29.99));
    }

    #[test]
    fn test_gaming_price_free() {
        let html = Html::parse_document(
            r#"<div class="game_purchase_price price">Free to Play</div>"#,
        );
        assert_eq!(gaming_price(&html), Some(0.0));
    }

    #[test]
    fn test_gaming_price_regular() {
        let html = Html::parse_document(r#"<div class="game_purchase_price">$19.99</div>"#);
        assert_eq!(gaming_price(&html), Some(19.99));
    }

    #[test]
    fn test_gaming_price_missing() {
        let html = Html::parse_document("<html><body><p>Coming soon</p></body></html>");
        assert_eq!(gaming_price(&html), None);
    }
}
