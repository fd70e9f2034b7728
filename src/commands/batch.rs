//! Batch extraction command.

use crate::config::Config;
use crate::extract::models::BatchItem;
use crate::extract::{BatchOrchestrator, ExtractionEngine, HttpClient, PageFetcher};
use crate::format::Formatter;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Extracts many product URLs and formats the combined result.
pub struct BatchCommand {
    config: Config,
}

impl BatchCommand {
    /// Creates a new batch command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the batch, returning formatted output and the failure count.
    pub async fn execute(&self, urls: Vec<String>) -> Result<(String, usize)> {
        let client = HttpClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_fetcher(client, urls).await
    }

    /// Runs the batch with a provided fetcher (for testing).
    pub async fn execute_with_fetcher<F: PageFetcher + 'static>(
        &self,
        fetcher: F,
        urls: Vec<String>,
    ) -> Result<(String, usize)> {
        let items = self.run(fetcher, urls).await;
        let failed = items.iter().filter(|item| !item.is_success()).count();

        let formatter = Formatter::new(self.config.format);
        Ok((formatter.format_batch(&items), failed))
    }

    async fn run<F: PageFetcher + 'static>(&self, fetcher: F, urls: Vec<String>) -> Vec<BatchItem> {
        info!("Starting batch of {} URLs", urls.len());

        let engine = ExtractionEngine::new(fetcher).with_referer(self.config.referer.clone());
        let orchestrator = BatchOrchestrator::new(engine).with_jitter(self.config.delay_jitter_ms);

        orchestrator.run(&self.config.batch_request(urls)).await
    }
}

/// Reads URLs from a file, one per line. Blank lines and `#` comments are skipped.
pub fn read_url_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
