//! Layered field extraction.
//!
//! Every field is resolved by walking [`Source::ORDER`] and stopping at the
//! first source that yields a usable value:
//!
//! 1. structured data (JSON-LD)
//! 2. metadata tags (`og:title`, `og:price:amount`, `og:image`, ...)
//! 3. the site profile's selectors
//! 4. the generic fallback selectors

use crate::extract::image::is_placeholder;
use crate::extract::price::parse_price;
use crate::extract::selectors::{generic, meta, IMAGE_ATTRS};
use crate::extract::sites::SiteProfile;
use crate::extract::structured::StructuredRecord;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// The required product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Price,
    Image,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Price, Field::Image];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Price => write!(f, "price"),
            Field::Image => write!(f, "image"),
        }
    }
}

/// Where a field value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    StructuredData,
    MetaTag,
    SiteSelector,
    GenericSelector,
}

impl Source {
    /// Evaluation order, highest precedence first.
    pub const ORDER: [Source; 4] =
        [Source::StructuredData, Source::MetaTag, Source::SiteSelector, Source::GenericSelector];
}

/// A resolved field value and its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: String,
    pub source: Source,
}

/// Resolves product fields from one parsed page.
pub struct FieldExtractor<'a> {
    document: &'a Html,
    record: Option<&'a StructuredRecord>,
    profile: &'a SiteProfile,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(
        document: &'a Html,
        record: Option<&'a StructuredRecord>,
        profile: &'a SiteProfile,
    ) -> Self {
        Self { document, record, profile }
    }

    /// Resolves a field using the first source that produces a value.
    ///
    /// Price candidates only count if they parse as a number, so the
    /// returned value for [`Field::Price`] is always parseable.
    pub fn extract(&self, field: Field) -> Option<Extracted> {
        let found = Source::ORDER.into_iter().find_map(|source| {
            self.from_source(field, source).map(|value| Extracted { value, source })
        });

        match &found {
            Some(extracted) => debug!("{} from {:?}: {:?}", field, extracted.source, extracted.value),
            None => debug!("{} not found in any source", field),
        }

        found
    }

    /// Resolves a field from a single source.
    pub fn from_source(&self, field: Field, source: Source) -> Option<String> {
        match source {
            Source::StructuredData => self.from_structured(field),
            Source::MetaTag => self.from_meta(field),
            Source::SiteSelector => self.from_selectors(field, self.profile.selectors(field)),
            Source::GenericSelector => self.from_selectors(field, generic_selectors(field)),
        }
    }

    /// Description from structured data, then description meta tags.
    pub fn description(&self) -> Option<String> {
        self.record
            .and_then(StructuredRecord::description)
            .or_else(|| first_meta(self.document, meta::DESCRIPTION))
    }

    fn from_structured(&self, field: Field) -> Option<String> {
        let record = self.record?;
        match field {
            Field::Name => record.name(),
            Field::Price => record.price().map(|p| p.to_string()),
            Field::Image => record.image().filter(|src| !is_placeholder(src)),
        }
    }

    fn from_meta(&self, field: Field) -> Option<String> {
        let tags = match field {
            Field::Name => meta::NAME,
            Field::Price => meta::PRICE,
            Field::Image => meta::IMAGE,
        };

        tags.iter()
            .filter_map(|(selector, attr)| attr_of_first(self.document, selector, attr))
            .find(|value| accepts(field, value))
    }

    fn from_selectors(&self, field: Field, selectors: &[&str]) -> Option<String> {
        for selector in selectors {
            let Ok(parsed) = Selector::parse(selector) else {
                trace!("Skipping invalid selector: {}", selector);
                continue;
            };

            let value = self.document.select(&parsed).find_map(|element| match field {
                Field::Image => image_source(element),
                Field::Name | Field::Price => {
                    Some(element_text(element)).filter(|text| accepts(field, text))
                }
            });

            if value.is_some() {
                trace!("{} matched selector {}", field, selector);
                return value;
            }
        }

        None
    }
}

fn generic_selectors(field: Field) -> &'static [&'static str] {
    match field {
        Field::Name => generic::NAME,
        Field::Price => generic::PRICE,
        Field::Image => generic::IMAGE,
    }
}

/// Whether a candidate value counts as a match for the field.
fn accepts(field: Field, value: &str) -> bool {
    match field {
        Field::Name => !value.is_empty(),
        Field::Price => parse_price(value).is_some(),
        Field::Image => !value.is_empty() && !is_placeholder(value),
    }
}

/// Trimmed text content with whitespace runs collapsed.
pub fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first non-empty, non-placeholder image attribute.
pub fn image_source(element: ElementRef) -> Option<String> {
    IMAGE_ATTRS.iter().find_map(|attr| {
        element
            .value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| accepts(Field::Image, v))
            .map(String::from)
    })
}

fn attr_of_first(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    document
        .select(&parsed)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

fn first_meta(document: &Html, tags: &[(&str, &str)]) -> Option<String> {
    tags.iter().find_map(|(selector, attr)| attr_of_first(document, selector, attr))
}
