//! HTTP fetching using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::error::ExtractError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::redirect::Policy;
use wreq::Client;
use wreq_util::Emulation;

/// Status reported when the redirect limit is exceeded; the client never
/// surfaces the final 3xx itself.
pub const TOO_MANY_REDIRECTS: u16 = 310;

/// A single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub timeout: Duration,
    /// Sent as the `Referer` header when set
    pub referer: Option<String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout, referer: None }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// The raw response. Non-success statuses are returned, not raised, so the
/// caller can tailor its error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FetchedPage {
    /// Creates a page with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), ..Self::default() }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Trait for page fetching - enables mocking for tests.
///
/// Implementations enforce `request.timeout` and report transport failures
/// as [`ExtractError::Timeout`], [`ExtractError::DnsFailure`] or
/// [`ExtractError::Network`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, ExtractError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, ExtractError> {
        (**self).fetch(request).await
    }
}

/// Production fetcher with browser impersonation.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(Policy::limited(config.max_redirects))
            .connect_timeout(Duration::from_secs(10));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn send(&self, request: &FetchRequest) -> Result<FetchedPage, wreq::Error> {
        let mut builder = self
            .client
            .get(&request.url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Upgrade-Insecure-Requests", "1");

        if let Some(referer) = &request.referer {
            builder = builder.header("Referer", referer.as_str());
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let final_url = response.uri().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = response.text().await?;

        Ok(FetchedPage { status, final_url, headers, body })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, ExtractError> {
        debug!("GET {}", request.url);

        match tokio::time::timeout(request.timeout, self.send(request)).await {
            Err(_) => {
                warn!("Timed out after {:?}: {}", request.timeout, request.url);
                Err(ExtractError::Timeout { timeout_ms: request.timeout.as_millis() as u64 })
            }
            Ok(Err(e)) => Err(classify_transport_error(&e, request)),
            Ok(Ok(page)) => {
                debug!("Response status: {} ({} bytes)", page.status, page.body.len());
                Ok(page)
            }
        }
    }
}

/// Maps a transport error onto the taxonomy by walking its source chain.
fn classify_transport_error(error: &(dyn std::error::Error + 'static), request: &FetchRequest) -> ExtractError {
    let mut chain = Vec::new();
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = current {
        chain.push(e.to_string().to_lowercase());
        current = e.source();
    }

    let is_dns = chain.iter().any(|msg| {
        msg.contains("dns error")
            || msg.contains("failed to lookup address")
            || msg.contains("name or service not known")
            || msg.contains("no such host")
            || msg.contains("nodename nor servname")
    });
    let is_timeout = chain.iter().any(|msg| msg.contains("timed out") || msg.contains("timeout"));
    let is_redirect_loop = chain
        .iter()
        .any(|msg| msg.contains("too many redirects") || msg.contains("error following redirect"));

    if is_redirect_loop {
        warn!("Redirect limit exceeded: {}", request.url);
        ExtractError::Http { status: TOO_MANY_REDIRECTS }
    } else if is_dns {
        let host = url::Url::parse(&request.url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
            .unwrap_or_else(|| request.url.clone());
        ExtractError::DnsFailure { host }
    } else if is_timeout {
        ExtractError::Timeout { timeout_ms: request.timeout.as_millis() as u64 }
    } else {
        ExtractError::Network(chain.join(": "))
    }
}
