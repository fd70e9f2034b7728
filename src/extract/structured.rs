//! JSON-LD product discovery.
//!
//! Scans `<script type="application/ld+json">` blocks in document order and
//! returns the first product-shaped object. Within a block (top-level array
//! or `@graph`), `Product` beats `VideoGame`, which beats
//! `SoftwareApplication`.

use crate::extract::price::parse_price;
use crate::extract::selectors::STRUCTURED_DATA;
use scraper::Html;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Accepted `@type` values, highest priority first.
pub const PRODUCT_TYPES: [&str; 3] = ["Product", "VideoGame", "SoftwareApplication"];

/// A product-shaped JSON-LD object.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord {
    data: Map<String, Value>,
}

impl StructuredRecord {
    /// Wraps a JSON object. Returns `None` for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|data| Self { data: data.clone() })
    }

    /// The first product type this record declares.
    pub fn record_type(&self) -> Option<&'static str> {
        PRODUCT_TYPES.into_iter().find(|t| has_type(&self.data, t))
    }

    /// Product name.
    pub fn name(&self) -> Option<String> {
        self.text("name")
    }

    /// Product price, tried as `offers.price`, `offers[0].price`,
    /// `offers.lowPrice`, then bare `price`.
    pub fn price(&self) -> Option<f64> {
        let offers = self.data.get("offers");
        let candidates = [
            offers.and_then(|o| o.get("price")),
            offers.and_then(|o| o.as_array()).and_then(|a| a.first()).and_then(|o| o.get("price")),
            offers.and_then(|o| o.get("lowPrice")),
            self.data.get("price"),
        ];

        candidates.into_iter().flatten().find_map(numeric)
    }

    /// Image URL. Lists yield their first element; `ImageObject`s their `url`.
    pub fn image(&self) -> Option<String> {
        let image = match self.data.get("image")? {
            Value::Array(items) => items.first()?,
            other => other,
        };

        match image {
            Value::String(s) => non_empty(s),
            Value::Object(obj) => obj
                .get("url")
                .or_else(|| obj.get("contentUrl"))
                .and_then(Value::as_str)
                .and_then(non_empty),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<String> {
        self.text("description")
    }

    pub fn genre(&self) -> Option<String> {
        self.joined("genre")
    }

    /// `gamePlatform`, falling back to `operatingSystem`.
    pub fn platform(&self) -> Option<String> {
        self.joined("gamePlatform").or_else(|| self.joined("operatingSystem"))
    }

    pub fn publisher(&self) -> Option<String> {
        self.party("publisher")
    }

    /// Developer, taken from `author`.
    pub fn developer(&self) -> Option<String> {
        self.party("author")
    }

    pub fn release_date(&self) -> Option<String> {
        self.text("datePublished")
    }

    fn text(&self, key: &str) -> Option<String> {
        self.data.get(key).and_then(Value::as_str).and_then(non_empty)
    }

    /// A string, or a list of strings joined with ", ".
    fn joined(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => non_empty(s),
            Value::Array(items) => {
                let parts: Vec<&str> =
                    items.iter().filter_map(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            _ => None,
        }
    }

    /// A person/organization: string, `{ "name": .. }`, or a list of those.
    fn party(&self, key: &str) -> Option<String> {
        fn party_name(value: &Value) -> Option<String> {
            match value {
                Value::String(s) => non_empty(s),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).and_then(non_empty),
                _ => None,
            }
        }

        match self.data.get(key)? {
            Value::Array(items) => {
                let names: Vec<String> = items.iter().filter_map(party_name).collect();
                if names.is_empty() {
                    None
                } else {
                    Some(names.join(", "))
                }
            }
            other => party_name(other),
        }
    }
}

/// Finds the first product-shaped JSON-LD record in the page.
///
/// Blocks that fail to parse are skipped. Returns `None` when no block
/// yields a record.
pub fn locate(document: &Html) -> Option<StructuredRecord> {
    for (index, element) in document.select(&STRUCTURED_DATA).enumerate() {
        let content = element.text().collect::<String>();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping unparsable JSON-LD block #{}: {}", index, e);
                continue;
            }
        };

        if let Some(found) = find_in_value(&value) {
            trace!("Structured data found in block #{} ({:?})", index, found.record_type());
            return Some(found);
        }
    }

    None
}

fn find_in_value(value: &Value) -> Option<StructuredRecord> {
    match value {
        Value::Array(items) => best_of(items),
        Value::Object(obj) => {
            if is_product_shaped(obj) {
                return StructuredRecord::from_value(value);
            }

            if let Some(Value::Array(graph)) = obj.get("@graph") {
                if let Some(found) = best_of(graph) {
                    return Some(found);
                }
            }

            match obj.get("mainEntity") {
                Some(entity) if entity.as_object().is_some_and(is_product_shaped) => {
                    StructuredRecord::from_value(entity)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Picks the highest-priority product type among candidates.
fn best_of(items: &[Value]) -> Option<StructuredRecord> {
    PRODUCT_TYPES.iter().find_map(|wanted| {
        items
            .iter()
            .find(|item| item.as_object().is_some_and(|obj| has_type(obj, wanted)))
            .and_then(StructuredRecord::from_value)
    })
}

fn is_product_shaped(obj: &Map<String, Value>) -> bool {
    PRODUCT_TYPES.iter().any(|t| has_type(obj, t))
}

/// Matches `@type` as a string or list, ignoring `schema:` or URL prefixes.
fn has_type(obj: &Map<String, Value>, wanted: &str) -> bool {
    let matches = |t: &str| t.rsplit(['/', ':']).next() == Some(wanted);

    match obj.get("@type") {
        Some(Value::String(t)) => matches(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
