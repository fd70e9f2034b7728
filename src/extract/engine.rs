//! Single-URL extraction: fetch, locate structured data, resolve fields,
//! apply the completeness policy.

use crate::error::ExtractError;
use crate::extract::client::{FetchRequest, FetchedPage, PageFetcher};
use crate::extract::fields::{Field, FieldExtractor};
use crate::extract::models::{
    ExtractOptions, ExtractionResult, ExtractionStatus, GameMetadata, UNKNOWN_PRODUCT,
};
use crate::extract::price::{detect_currency, gaming_price, parse_price};
use crate::extract::structured::{self, StructuredRecord};
use crate::extract::{image, sites};
use chrono::Utc;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Referer sent with every fetch unless overridden.
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

/// Extracts product details from one URL at a time.
pub struct ExtractionEngine<F> {
    fetcher: F,
    referer: Option<String>,
}

impl<F: PageFetcher> ExtractionEngine<F> {
    /// Creates an engine around a fetcher.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, referer: Some(DEFAULT_REFERER.to_string()) }
    }

    /// Overrides the referer hint (None disables it).
    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }

    /// Fetches and extracts one product page.
    ///
    /// Fails on invalid input, on fetch/status errors, and, when partial
    /// results are disabled, on the first missing required field.
    pub async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult, ExtractError> {
        let page_url = validate_url(url)?;
        let domain = sites::bare_domain(page_url.host_str().unwrap_or_default());

        let mut request =
            FetchRequest::new(page_url.as_str(), Duration::from_millis(options.timeout_ms));
        if let Some(referer) = &self.referer {
            request = request.with_referer(referer.clone());
        }

        info!("Fetching product page: {}", url);
        let page = self.fetcher.fetch(&request).await?;
        if !page.final_url.is_empty() && page.final_url != page_url.as_str() {
            debug!("Redirected to {}", page.final_url);
        }
        check_status(&page, &domain, url)?;

        extract_page(url, &page_url, &page.body, options.allow_partial_results)
    }
}

/// Parses `url`, requiring an http(s) scheme and a host.
pub fn validate_url(url: &str) -> Result<Url, ExtractError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::InvalidInput("URL is required".to_string()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ExtractError::InvalidInput(format!("Invalid URL '{}': {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ExtractError::InvalidInput(format!(
            "Invalid URL '{}': expected an http(s) URL with a host",
            trimmed
        )));
    }

    Ok(parsed)
}

/// Maps a response status onto the error taxonomy. Any 2xx passes.
pub fn check_status(page: &FetchedPage, domain: &str, url: &str) -> Result<(), ExtractError> {
    debug!("Response status: {}", page.status);

    match page.status {
        200..=299 => Ok(()),
        403 => {
            warn!("Access denied (403) by {}", domain);
            Err(ExtractError::AccessDenied { site: domain.to_string() })
        }
        404 => Err(ExtractError::NotFound { url: url.to_string() }),
        429 | 529 => {
            warn!("Rate limited ({}) by {}. Consider increasing --delay.", page.status, domain);
            let retry_after = page.header("retry-after").and_then(|v| v.trim().parse().ok());
            Err(ExtractError::RateLimited { site: domain.to_string(), status: page.status, retry_after })
        }
        status => Err(ExtractError::Http { status }),
    }
}

/// Extracts a result from already-fetched markup.
///
/// `url` is echoed verbatim into the result; `page_url` is the parsed form
/// used for the site lookup and image resolution.
pub fn extract_page(
    url: &str,
    page_url: &Url,
    html: &str,
    allow_partial: bool,
) -> Result<ExtractionResult, ExtractError> {
    let domain = sites::bare_domain(page_url.host_str().unwrap_or_default());
    let profile = sites::lookup(&domain);
    let is_gaming = sites::is_gaming_domain(&domain);

    let document = Html::parse_document(html);
    let record = structured::locate(&document);
    debug!(
        "Extracting {} with {} profile (structured data: {})",
        domain,
        profile.label,
        record.as_ref().and_then(StructuredRecord::record_type).unwrap_or("none")
    );

    let extractor = FieldExtractor::new(&document, record.as_ref(), profile);
    let mut policy = CompletenessPolicy::new(url, allow_partial);

    let name = extractor.extract(Field::Name).map(|e| clean_name(&e.value));
    let name = policy.require(Field::Name, name, UNKNOWN_PRODUCT.to_string())?;

    let mut price = extractor.extract(Field::Price).and_then(|e| {
        if let Some(currency) = detect_currency(&e.value) {
            debug!("Price currency: {}", currency);
        }
        parse_price(&e.value)
    });
    if price.is_none() && is_gaming {
        price = gaming_price(&document);
    }
    let price = policy.require(Field::Price, price, 0.0)?;

    let thumbnail = extractor.extract(Field::Image).map(|e| image::resolve(&e.value, page_url));
    let thumbnail = policy.require(Field::Image, thumbnail, String::new())?;

    let description = extractor.description().unwrap_or_default();

    let game_metadata = if is_gaming {
        record.as_ref().map(game_metadata).filter(|meta| !meta.is_empty())
    } else {
        None
    };

    let status = policy.finish(!profile.is_generic());
    if !status.is_complete {
        info!("Partial result for {}: {}", url, status.warnings.join("; "));
    }

    Ok(ExtractionResult {
        name,
        price,
        thumbnail,
        description,
        site: domain,
        scraped_at: Utc::now(),
        url: url.to_string(),
        game_metadata,
        status,
    })
}

/// Strips trailing site branding: everything from the first `|` or `-`.
///
/// Whitespace runs are collapsed first. If nothing would remain, the whole
/// name is kept.
pub fn clean_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let head = collapsed.split(['|', '-']).next().unwrap_or_default().trim();

    if head.is_empty() {
        collapsed
    } else {
        head.to_string()
    }
}

fn game_metadata(record: &StructuredRecord) -> GameMetadata {
    GameMetadata {
        genre: record.genre(),
        platform: record.platform(),
        publisher: record.publisher(),
        developer: record.developer(),
        release_date: record.release_date(),
    }
}

/// Decides what happens when a required field is missing.
///
/// With partial results allowed, a default is substituted and a warning
/// recorded; otherwise the extraction fails for that field.
pub struct CompletenessPolicy<'a> {
    url: &'a str,
    allow_partial: bool,
    warnings: Vec<String>,
}

impl<'a> CompletenessPolicy<'a> {
    pub fn new(url: &'a str, allow_partial: bool) -> Self {
        Self { url, allow_partial, warnings: Vec::new() }
    }

    /// Returns the value, or the default plus a warning, or an error.
    pub fn require<T>(&mut self, field: Field, value: Option<T>, default: T) -> Result<T, ExtractError> {
        match value {
            Some(value) => Ok(value),
            None if self.allow_partial => {
                self.warnings.push(missing_warning(field));
                Ok(default)
            }
            None => Err(ExtractError::Incomplete { field, url: self.url.to_string() }),
        }
    }

    /// Builds the final status.
    pub fn finish(self, site_supported: bool) -> ExtractionStatus {
        ExtractionStatus { is_complete: self.warnings.is_empty(), warnings: self.warnings, site_supported }
    }
}

fn missing_warning(field: Field) -> String {
    match field {
        Field::Name => format!("Could not extract product name; using \"{}\"", UNKNOWN_PRODUCT),
        Field::Price => "Could not extract price; defaulted to 0".to_string(),
        Field::Image => "Could not extract product image".to_string(),
    }
}
