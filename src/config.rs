//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::extract::engine::DEFAULT_REFERER;
use crate::extract::models::{BatchRequest, ExtractOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fetch timeout per URL in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Batch window size (simultaneous fetches)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the pause between batch windows
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Maximum redirects to follow
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Substitute defaults for missing fields instead of failing
    #[serde(default = "default_allow_partial")]
    pub allow_partial: bool,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Referer header sent with each fetch
    #[serde(default = "default_referer")]
    pub referer: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_concurrency() -> usize {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_max_redirects() -> usize {
    5
}

fn default_allow_partial() -> bool {
    true
}

fn default_referer() -> Option<String> {
    Some(DEFAULT_REFERER.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            max_redirects: default_max_redirects(),
            allow_partial: default_allow_partial(),
            proxy: None,
            referer: default_referer(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("wish-scraper").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparsable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("WISH_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("WISH_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_ms = t;
            }
        }

        if let Ok(concurrency) = std::env::var("WISH_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }

        if let Ok(delay) = std::env::var("WISH_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// Options for a single extraction.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions { allow_partial_results: self.allow_partial, timeout_ms: self.timeout_ms }
    }

    /// A batch request over `urls` using these settings.
    pub fn batch_request(&self, urls: Vec<String>) -> BatchRequest {
        BatchRequest {
            urls,
            concurrency: self.concurrency.max(1),
            delay_between_requests_ms: self.delay_ms,
            allow_partial_results: self.allow_partial,
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 0);
        assert_eq!(config.max_redirects, 5);
        assert!(config.allow_partial);
        assert!(config.proxy.is_none());
        assert_eq!(config.referer.as_deref(), Some("https://www.google.com/"));
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            timeout_ms = 5000
            concurrency = 8
            allow_partial = false
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.concurrency, 8);
        assert!(!config.allow_partial);
        assert_eq!(config.format, OutputFormat::Json);
        // Unset fields keep defaults
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.max_redirects, 5);
        assert!(config.referer.is_some());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            delay_ms = 250
            proxy = "socks5://localhost:1080"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.delay_ms, 250);
        assert_eq!(config.proxy.as_deref(), Some("socks5://localhost:1080"));
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "concurrency = 2").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_config_with_env() {
        let orig_timeout = std::env::var("WISH_TIMEOUT").ok();
        let orig_concurrency = std::env::var("WISH_CONCURRENCY").ok();

        std::env::set_var("WISH_TIMEOUT", "2500");
        std::env::set_var("WISH_CONCURRENCY", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.timeout_ms, 2500);
        // Invalid values are ignored
        assert_eq!(config.concurrency, 3);

        match orig_timeout {
            Some(v) => std::env::set_var("WISH_TIMEOUT", v),
            None => std::env::remove_var("WISH_TIMEOUT"),
        }
        match orig_concurrency {
            Some(v) => std::env::set_var("WISH_CONCURRENCY", v),
            None => std::env::remove_var("WISH_CONCURRENCY"),
        }
    }

    #[test]
    fn test_derived_requests() {
        let config = Config { concurrency: 0, allow_partial: false, timeout_ms: 750, ..Config::default() };

        let options = config.extract_options();
        assert!(!options.allow_partial_results);
        assert_eq!(options.timeout_ms, 750);

        let request = config.batch_request(vec!["https://a.test".to_string()]);
        assert_eq!(request.concurrency, 1);
        assert_eq!(request.delay_between_requests_ms, 1000);
        assert_eq!(request.urls.len(), 1);
    }
}
