//! Windowed batch extraction.
//!
//! URLs are processed in consecutive windows of `concurrency` items. Each
//! window is served by one worker task per URL reporting back over a
//! channel; the orchestrator waits for the whole window before moving on,
//! so output order always matches input order.

use crate::extract::client::PageFetcher;
use crate::extract::engine::ExtractionEngine;
use crate::extract::models::{BatchItem, BatchRequest, ErrorResult, ExtractOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

/// Runs an [`ExtractionEngine`] over many URLs.
pub struct BatchOrchestrator<F> {
    engine: Arc<ExtractionEngine<F>>,
    jitter_ms: u64,
}

impl<F: PageFetcher + 'static> BatchOrchestrator<F> {
    /// Creates an orchestrator around an engine.
    pub fn new(engine: ExtractionEngine<F>) -> Self {
        Self { engine: Arc::new(engine), jitter_ms: 0 }
    }

    /// Adds up to `jitter_ms` of random delay to each pause between windows.
    pub fn with_jitter(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Extracts every valid URL in the request.
    ///
    /// Never fails: per-item errors become [`BatchItem::Failure`] entries.
    /// URLs that do not parse are dropped and not represented in the output.
    pub async fn run(&self, request: &BatchRequest) -> Vec<BatchItem> {
        let urls = valid_urls(&request.urls);
        let concurrency = request.concurrency.max(1);
        let delay = Duration::from_millis(request.delay_between_requests_ms);
        let options = request.options();

        let windows: Vec<&[String]> = urls.chunks(concurrency).collect();
        info!(
            "Batch of {} URLs ({} dropped) in {} window(s) of {}",
            urls.len(),
            request.urls.len() - urls.len(),
            windows.len(),
            concurrency
        );

        let mut results = Vec::with_capacity(urls.len());
        for (index, window) in windows.iter().enumerate() {
            if index > 0 {
                self.pause(delay * concurrency as u32).await;
            }

            let items = self.run_window(window, delay, options).await;
            debug!("Window {}/{} complete", index + 1, windows.len());
            results.extend(items);
        }

        let failures = results.iter().filter(|item| !item.is_success()).count();
        info!("Batch complete: {} succeeded, {} failed", results.len() - failures, failures);

        results
    }

    /// Dispatches one window and waits for all of it.
    async fn run_window(&self, window: &[String], delay: Duration, options: ExtractOptions) -> Vec<BatchItem> {
        let (tx, mut rx) = mpsc::channel(window.len());

        for (slot, url) in window.iter().enumerate() {
            let tx = tx.clone();
            let engine = Arc::clone(&self.engine);
            let url = url.clone();
            let stagger = delay * slot as u32;

            tokio::spawn(async move {
                if !stagger.is_zero() {
                    tokio::time::sleep(stagger).await;
                }

                let item = match engine.extract(&url, &options).await {
                    Ok(result) => BatchItem::Success(result),
                    Err(e) => {
                        warn!("Failed to extract {}: {}", url, e);
                        BatchItem::Failure(ErrorResult::from_error(url, &e))
                    }
                };

                // Receiver only goes away if the batch itself was dropped.
                let _ = tx.send((slot, item)).await;
            });
        }
        drop(tx);

        let mut slots: Vec<Option<BatchItem>> = vec![None; window.len()];
        while let Some((slot, item)) = rx.recv().await {
            slots[slot] = Some(item);
        }

        slots
            .into_iter()
            .zip(window)
            .map(|(item, url)| {
                item.unwrap_or_else(|| {
                    warn!("Worker for {} exited without a result", url);
                    BatchItem::Failure(ErrorResult::new(url.clone(), "Extraction task aborted"))
                })
            })
            .collect()
    }

    async fn pause(&self, base: Duration) {
        let jitter = if self.jitter_ms > 0 { rand::random_range(0..=self.jitter_ms) } else { 0 };

        let total = base + Duration::from_millis(jitter);
        if total.is_zero() {
            return;
        }

        debug!("Delaying {}ms before next window", total.as_millis());
        tokio::time::sleep(total).await;
    }
}

/// Keeps the URLs that parse, trimmed, in input order.
pub fn valid_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|url| url.trim())
        .filter(|url| {
            let ok = !url.is_empty() && Url::parse(url).is_ok();
            if !ok {
                debug!("Dropping malformed URL: {:?}", url);
            }
            ok
        })
        .map(String::from)
        .collect()
}
