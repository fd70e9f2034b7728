//! Product-detail extraction: fetching, structured data, field fallback,
//! price normalization and batch orchestration.

pub mod batch;
pub mod classifier;
pub mod client;
pub mod engine;
pub mod fields;
pub mod image;
pub mod models;
pub mod price;
pub mod selectors;
pub mod sites;
pub mod structured;

pub use batch::BatchOrchestrator;
pub use classifier::is_likely_product_url;
pub use client::{FetchRequest, FetchedPage, HttpClient, PageFetcher};
pub use engine::ExtractionEngine;
pub use fields::{Field, FieldExtractor, Source};
pub use models::{
    BatchItem, BatchRequest, ErrorResult, ExtractOptions, ExtractionResult, ExtractionStatus,
    GameMetadata,
};
pub use sites::SiteProfile;

use crate::config::Config;
use crate::error::ExtractError;

/// Extracts one product page with a default HTTP client.
pub async fn extract_one(url: &str, options: &ExtractOptions) -> Result<ExtractionResult, ExtractError> {
    let client = HttpClient::new(&Config::default()).map_err(|e| ExtractError::Network(format!("{:#}", e)))?;
    ExtractionEngine::new(client).extract(url, options).await
}

/// Extracts a batch with a default HTTP client. Never fails; errors are
/// embedded per item.
pub async fn extract_batch(request: &BatchRequest) -> Vec<BatchItem> {
    match HttpClient::new(&Config::default()) {
        Ok(client) => BatchOrchestrator::new(ExtractionEngine::new(client)).run(request).await,
        Err(e) => {
            let message = format!("Failed to create HTTP client: {:#}", e);
            batch::valid_urls(&request.urls)
                .into_iter()
                .map(|url| BatchItem::Failure(ErrorResult::new(url, message.clone())))
                .collect()
        }
    }
}
