//! Single-page extraction command.

use crate::config::Config;
use crate::extract::{ExtractionEngine, HttpClient, PageFetcher};
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::info;

/// Extracts one product URL and formats the result.
pub struct ExtractCommand {
    config: Config,
}

impl ExtractCommand {
    /// Creates a new extract command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches and extracts `url`, returning formatted output.
    pub async fn execute(&self, url: &str) -> Result<String> {
        let client = HttpClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_fetcher(client, url).await
    }

    /// Extracts with a provided fetcher (for testing).
    pub async fn execute_with_fetcher<F: PageFetcher>(&self, fetcher: F, url: &str) -> Result<String> {
        let url = url.trim();
        info!("Extracting product: {}", url);

        let engine = ExtractionEngine::new(fetcher).with_referer(self.config.referer.clone());
        let result = engine.extract(url, &self.config.extract_options()).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_result(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::ExtractError;
    use crate::extract::{FetchRequest, FetchedPage};
    use async_trait::async_trait;

    /// Mock fetcher for testing.
    struct MockFetcher {
        status: u16,
        body: String,
    }

    impl MockFetcher {
        fn new(body: &str) -> Self {
            Self { status: 200, body: body.to_string() }
        }

        fn with_status(status: u16) -> Self {
            Self { status, body: String::new() }
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, _request: &FetchRequest) -> Result<FetchedPage, ExtractError> {
            Ok(FetchedPage::new(self.status, self.body.clone()))
        }
    }

    fn make_test_config() -> Config {
        Config { delay_ms: 0, ..Config::default() }
    }

    fn make_product_html(name: &str, price: &str) -> String {
        format!(
            r#"<html><head>
                <meta property="og:title" content="{}">
                <meta property="og:price:amount" content="{}">
                <meta property="og:image" content="https://cdn.test/item.jpg">
            </head><body></body></html>"#,
            name, price
        )
    }

    #[tokio::test]
    async fn test_extract_command_basic() {
        let cmd = ExtractCommand::new(make_test_config());
        let fetcher = MockFetcher::new(&make_product_html("Walnut Shelf", "89.00"));

        let output = cmd.execute_with_fetcher(fetcher, "https://shop.test/p/shelf").await.unwrap();
        assert!(output.contains("Walnut Shelf"));
        assert!(output.contains("89.00"));
        assert!(output.contains("shop.test"));
    }

    #[tokio::test]
    async fn test_extract_command_trims_url() {
        let cmd = ExtractCommand::new(make_test_config());
        let fetcher = MockFetcher::new(&make_product_html("Walnut Shelf", "89.00"));

        let result = cmd.execute_with_fetcher(fetcher, "  https://shop.test/p/shelf  ").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_extract_command_json_format() {
        let config = Config { format: OutputFormat::Json, ..make_test_config() };
        let cmd = ExtractCommand::new(config);
        let fetcher = MockFetcher::new(&make_product_html("Walnut Shelf", "89.00"));

        let output = cmd.execute_with_fetcher(fetcher, "https://shop.test/p/shelf").await.unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"scrapedAt\""));
        assert!(output.contains("\"isComplete\": true"));
    }

    #[tokio::test]
    async fn test_extract_command_strict_missing_fields() {
        let config = Config { allow_partial: false, ..make_test_config() };
        let cmd = ExtractCommand::new(config);
        let fetcher = MockFetcher::new("<html><body><p>nothing here</p></body></html>");

        let err = cmd.execute_with_fetcher(fetcher, "https://shop.test/p/empty").await.unwrap_err();
        assert!(err.to_string().contains("Could not extract product name"));
    }

    #[tokio::test]
    async fn test_extract_command_partial_missing_fields() {
        let cmd = ExtractCommand::new(make_test_config());
        let fetcher = MockFetcher::new("<html><body><p>nothing here</p></body></html>");

        let output = cmd.execute_with_fetcher(fetcher, "https://shop.test/p/empty").await.unwrap();
        assert!(output.contains("Unknown Product"));
        assert!(output.contains("Partial"));
    }

    #[tokio::test]
    async fn test_extract_command_access_denied() {
        let cmd = ExtractCommand::new(make_test_config());

        let err = cmd
            .execute_with_fetcher(MockFetcher::with_status(403), "https://shop.test/p/1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Access denied"));
    }

    #[tokio::test]
    async fn test_extract_command_invalid_url() {
        let cmd = ExtractCommand::new(make_test_config());

        let err = cmd.execute_with_fetcher(MockFetcher::new(""), "not a url").await.unwrap_err();
        assert!(err.to_string().contains("Invalid input"));
    }
}
