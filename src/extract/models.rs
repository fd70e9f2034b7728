//! Data models for extraction results, errors and batch requests.

use crate::error::ExtractError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default name used when no product name could be found.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// A normalized product record recovered from one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Product name with trailing site branding removed
    pub name: String,
    /// Numeric price (0 when unknown or free)
    pub price: f64,
    /// Absolute image URL, or empty
    pub thumbnail: String,
    /// Product description, or empty
    pub description: String,
    /// Bare hostname without `www.`
    pub site: String,
    /// When the page was scraped
    pub scraped_at: DateTime<Utc>,
    /// The URL exactly as the caller passed it
    pub url: String,
    /// Extra metadata recovered for gaming storefronts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_metadata: Option<GameMetadata>,
    /// Completeness and support information
    pub status: ExtractionStatus,
}

/// Completeness report attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStatus {
    pub is_complete: bool,
    pub warnings: Vec<String>,
    pub site_supported: bool,
}

/// Best-effort metadata for games. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl GameMetadata {
    /// Returns true if nothing was recovered.
    pub fn is_empty(&self) -> bool {
        self.genre.is_none()
            && self.platform.is_none()
            && self.publisher.is_none()
            && self.developer.is_none()
            && self.release_date.is_none()
    }
}

/// Outcome for a URL whose extraction could not proceed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    pub url: String,
    pub error: String,
    pub status: ExtractionStatus,
}

impl ErrorResult {
    /// Creates an error result carrying a failure message.
    pub fn new(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
            status: ExtractionStatus { is_complete: false, warnings: Vec::new(), site_supported: false },
        }
    }

    /// Creates an error result from a typed extraction error.
    pub fn from_error(url: impl Into<String>, error: &ExtractError) -> Self {
        Self::new(url, error.to_string())
    }
}

/// One entry of a batch: either a result or an embedded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Success(ExtractionResult),
    Failure(ErrorResult),
}

impl BatchItem {
    /// The URL this entry belongs to.
    pub fn url(&self) -> &str {
        match self {
            BatchItem::Success(result) => &result.url,
            BatchItem::Failure(error) => &error.url,
        }
    }

    /// Returns true for a successful (possibly partial) extraction.
    pub fn is_success(&self) -> bool {
        matches!(self, BatchItem::Success(_))
    }

    /// Returns the result if this entry succeeded.
    pub fn as_success(&self) -> Option<&ExtractionResult> {
        match self {
            BatchItem::Success(result) => Some(result),
            BatchItem::Failure(_) => None,
        }
    }

    /// Returns the error if this entry failed.
    pub fn as_failure(&self) -> Option<&ErrorResult> {
        match self {
            BatchItem::Success(_) => None,
            BatchItem::Failure(error) => Some(error),
        }
    }
}

impl From<Result<ExtractionResult, (String, ExtractError)>> for BatchItem {
    fn from(outcome: Result<ExtractionResult, (String, ExtractError)>) -> Self {
        match outcome {
            Ok(result) => BatchItem::Success(result),
            Err((url, error)) => BatchItem::Failure(ErrorResult::from_error(url, &error)),
        }
    }
}

/// Per-call options for a single extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Substitute defaults for missing fields instead of failing
    pub allow_partial_results: bool,
    /// Fetch timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { allow_partial_results: true, timeout_ms: 10_000 }
    }
}

/// Input for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub urls: Vec<String>,
    /// Window size; values below 1 are treated as 1
    pub concurrency: usize,
    pub delay_between_requests_ms: u64,
    pub allow_partial_results: bool,
    pub timeout_ms: u64,
}

impl BatchRequest {
    /// Creates a request with default options for the given URLs.
    pub fn new(urls: Vec<String>) -> Self {
        let options = ExtractOptions::default();
        Self {
            urls,
            concurrency: 3,
            delay_between_requests_ms: 1000,
            allow_partial_results: options.allow_partial_results,
            timeout_ms: options.timeout_ms,
        }
    }

    /// The per-item options forwarded to every extraction.
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions { allow_partial_results: self.allow_partial_results, timeout_ms: self.timeout_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result() -> ExtractionResult {
        ExtractionResult {
            name: "Test Product".to_string(),
            price: 19.99,
            thumbnail: "https://cdn.example.com/a.jpg".to_string(),
            description: String::new(),
            site: "example.com".to_string(),
            scraped_at: Utc::now(),
            url: "https://www.example.com/product/1".to_string(),
            game_metadata: None,
            status: ExtractionStatus { is_complete: true, warnings: Vec::new(), site_supported: false },
        }
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_string(&make_result()).unwrap();
        assert!(json.contains("\"scrapedAt\""));
        assert!(json.contains("\"isComplete\":true"));
        assert!(json.contains("\"siteSupported\":false"));
        assert!(!json.contains("gameMetadata"));
    }

    #[test]
    fn test_error_result() {
        let err = ExtractError::NotFound { url: "https://x.test/p/1".to_string() };
        let result = ErrorResult::from_error("https://x.test/p/1", &err);
        assert_eq!(result.url, "https://x.test/p/1");
        assert!(result.error.contains("404"));
        assert!(!result.status.is_complete);
        assert!(!result.status.site_supported);
    }

    #[test]
    fn test_batch_item_accessors() {
        let ok = BatchItem::Success(make_result());
        assert!(ok.is_success());
        assert_eq!(ok.url(), "https://www.example.com/product/1");
        assert!(ok.as_failure().is_none());

        let failed = BatchItem::from(Err::<ExtractionResult, _>((
            "https://x.test".to_string(),
            ExtractError::Timeout { timeout_ms: 100 },
        )));
        assert!(!failed.is_success());
        assert_eq!(failed.as_failure().unwrap().error, "Request timed out after 100ms");
    }

    #[test]
    fn test_batch_item_untagged_json() {
        let failed = BatchItem::Failure(ErrorResult::new("https://x.test", "boom"));
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.starts_with("{\"url\""));
        assert!(json.contains("\"error\":\"boom\""));
    }

    #[test]
    fn test_game_metadata_is_empty() {
        let mut meta = GameMetadata::default();
        assert!(meta.is_empty());
        meta.genre = Some("RPG".to_string());
        assert!(!meta.is_empty());
    }

    #[test]
    fn test_batch_request_options() {
        let mut request = BatchRequest::new(vec!["https://a.test".to_string()]);
        request.allow_partial_results = false;
        request.timeout_ms = 500;
        let options = request.options();
        assert!(!options.allow_partial_results);
        assert_eq!(options.timeout_ms, 500);
    }
}
