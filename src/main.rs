//! wish-scraper - Product-detail extraction CLI
//!
//! Extracts name, price, image and description from product pages with
//! browser TLS emulation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use wish_scraper::commands::batch::read_url_file;
use wish_scraper::commands::{BatchCommand, ExtractCommand};
use wish_scraper::config::{Config, OutputFormat};
use wish_scraper::extract::{is_likely_product_url, sites};

#[derive(Parser)]
#[command(
    name = "wish-scraper",
    version,
    about = "Extract product details from shop pages",
    long_about = "Fetches product pages with browser TLS emulation and extracts name, price, image and description from structured data, meta tags and site-specific selectors."
)]
struct Cli {
    // WISH_* variables are read by Config::with_env, which skips bad values.

    /// Fetch timeout per URL in milliseconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Number of URLs fetched at once in a batch
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one product page
    #[command(alias = "x")]
    Extract {
        /// Product page URL
        url: String,

        /// Fail instead of substituting defaults for missing fields
        #[arg(long)]
        strict: bool,
    },

    /// Extract many product pages
    #[command(alias = "b")]
    Batch {
        /// Product page URLs
        urls: Vec<String>,

        /// Read URLs from a file (one per line)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Fail instead of substituting defaults for missing fields
        #[arg(long)]
        strict: bool,
    },

    /// Check whether URLs look like product pages
    Classify {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// List sites with dedicated selectors
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(timeout) = cli.timeout {
        config.timeout_ms = timeout;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Extract { url, strict } => {
            if strict {
                config.allow_partial = false;
            }

            let cmd = ExtractCommand::new(config);
            let output = cmd.execute(&url).await?;
            println!("{}", output);
        }

        Commands::Batch { mut urls, file, strict } => {
            if let Some(path) = file {
                urls.extend(read_url_file(path)?);
            }
            if urls.is_empty() {
                anyhow::bail!("No URLs given. Pass URLs as arguments or use --file.");
            }
            if strict {
                config.allow_partial = false;
            }

            let cmd = BatchCommand::new(config);
            let (output, failed) = cmd.execute(urls).await?;
            println!("{}", output);

            if failed > 0 {
                eprintln!("{} URL(s) failed", failed);
            }
        }

        Commands::Classify { urls } => {
            for url in urls {
                let verdict = if is_likely_product_url(&url) { "product" } else { "-" };
                println!("{:<8} {}", verdict, url);
            }
        }

        Commands::Sites => {
            println!("Sites with dedicated selectors:\n");
            println!("{:<16} {:<20} {:<8}", "Keyword", "Site", "Gaming");
            println!("{:-<16} {:-<20} {:-<8}", "", "", "");

            for profile in sites::all() {
                let gaming = sites::GAMING_DOMAINS.iter().any(|d| d.contains(profile.domain_keyword));
                println!(
                    "{:<16} {:<20} {:<8}",
                    profile.domain_keyword,
                    profile.label,
                    if gaming { "yes" } else { "" }
                );
            }
        }
    }

    Ok(())
}
