//! wish-scraper - Product-detail extraction from arbitrary shop pages
//!
//! Fetches a product page with browser emulation, reads structured data,
//! meta tags and site-specific selectors, and returns a normalized record.

pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;

pub use config::Config;
pub use error::ExtractError;
pub use extract::models::{
    BatchItem, BatchRequest, ErrorResult, ExtractOptions, ExtractionResult, ExtractionStatus,
    GameMetadata,
};
pub use extract::{extract_batch, extract_one, is_likely_product_url};
