//! Error taxonomy for product extraction.

use crate::extract::fields::Field;
use thiserror::Error;

/// Everything that can stop a single extraction.
///
/// Inside a batch these are downgraded to [`ErrorResult`](crate::extract::models::ErrorResult)
/// entries, so only `extract_one` callers ever see them as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Empty or malformed URL argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP 403.
    #[error("Access denied (403) by {site}. The site is blocking automated requests.")]
    AccessDenied { site: String },

    /// HTTP 404.
    #[error("Product page not found (404): {url}")]
    NotFound { url: String },

    /// HTTP 429 or 529. The caller is expected to back off.
    #[error("Rate limited ({status}) by {site}.{}", retry_hint(.retry_after))]
    RateLimited { site: String, status: u16, retry_after: Option<u64> },

    /// The fetch exceeded the caller's timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Hostname could not be resolved.
    #[error("Could not resolve host: {host}")]
    DnsFailure { host: String },

    /// Any other non-success HTTP status.
    #[error("Request failed with status: {status}")]
    Http { status: u16 },

    /// Connection-level failure that is neither DNS nor a timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// A required field was missing and partial results were not allowed.
    #[error("Could not extract product {field} from {url}")]
    Incomplete { field: Field, url: String },
}

impl ExtractError {
    /// Returns true when retrying the same URL later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractError::Timeout { .. } | ExtractError::RateLimited { .. } | ExtractError::Network(_)
        )
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::InvalidInput(_) => "invalid_input",
            ExtractError::AccessDenied { .. } => "access_denied",
            ExtractError::NotFound { .. } => "not_found",
            ExtractError::RateLimited { .. } => "rate_limited",
            ExtractError::Timeout { .. } => "timeout",
            ExtractError::DnsFailure { .. } => "dns_failure",
            ExtractError::Http { .. } => "http_failure",
            ExtractError::Network(_) => "network",
            ExtractError::Incomplete { .. } => "extraction_incomplete",
        }
    }
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" Retry after {}s.", secs),
        None => " Try again later.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ExtractError::AccessDenied { site: "shop.example".to_string() };
        assert!(err.to_string().contains("Access denied"));
        assert!(err.to_string().contains("shop.example"));

        let err = ExtractError::NotFound { url: "https://shop.example/p/1".to_string() };
        assert!(err.to_string().contains("404"));

        let err = ExtractError::Timeout { timeout_ms: 2500 };
        assert_eq!(err.to_string(), "Request timed out after 2500ms");

        let err = ExtractError::Incomplete { field: Field::Price, url: "https://x.test".to_string() };
        assert_eq!(err.to_string(), "Could not extract product price from https://x.test");
    }

    #[test]
    fn test_rate_limited_retry_hint() {
        let err = ExtractError::RateLimited {
            site: "shop.example".to_string(),
            status: 429,
            retry_after: Some(30),
        };
        assert_eq!(err.to_string(), "Rate limited (429) by shop.example. Retry after 30s.");

        let err =
            ExtractError::RateLimited { site: "shop.example".to_string(), status: 529, retry_after: None };
        assert!(err.to_string().contains("Try again later"));
    }

    #[test]
    fn test_retryable() {
        assert!(ExtractError::Timeout { timeout_ms: 1 }.is_retryable());
        assert!(ExtractError::Network("reset".to_string()).is_retryable());
        assert!(!ExtractError::NotFound { url: String::new() }.is_retryable());
        assert!(!ExtractError::InvalidInput(String::new()).is_retryable());
        assert!(!ExtractError::DnsFailure { host: "nope.invalid".to_string() }.is_retryable());
    }

    #[test]
    fn test_kind() {
        assert_eq!(ExtractError::Http { status: 500 }.kind(), "http_failure");
        assert_eq!(
            ExtractError::Incomplete { field: Field::Name, url: String::new() }.kind(),
            "extraction_incomplete"
        );
    }
}
