//! Command-line interface definitions for the ThemeForest crawler.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every flag is optional: omitted flags fall through to the YAML config
//! file (if given) and then to the built-in defaults in
//! [`crate::config::CrawlConfig`].

use clap::Parser;

use crate::config::{OutputMode, PaginationPolicy};

/// Command-line arguments for the ThemeForest crawler.
///
/// # Examples
///
/// ```sh
/// # Crawl with defaults, artifacts in the current directory
/// themeforest_crawler
///
/// # Sharded output with bounded pagination, artifacts under ./out
/// themeforest_crawler -o ./out --output-mode sharded --pagination enumerated
///
/// # Full settings from a YAML file
/// themeforest_crawler --config crawl.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON artifacts
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Directory for the URL-keyed response cache
    #[arg(long, env = "THEMEFOREST_CACHE_DIR")]
    pub cache_dir: Option<String>,

    /// Namespace the cache directory with this run's id
    #[arg(long)]
    pub run_scoped_cache: bool,

    /// Optional path to a crawl config YAML file
    #[arg(short, long, env = "THEMEFOREST_CONFIG")]
    pub config: Option<String>,

    /// Site root to crawl (scheme included)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Listing path the category menu is read from
    #[arg(long)]
    pub start_path: Option<String>,

    /// Pagination policy: recursive or enumerated
    #[arg(long, value_enum)]
    pub pagination: Option<PaginationPolicy>,

    /// Output mode: single or sharded
    #[arg(long, value_enum)]
    pub output_mode: Option<OutputMode>,

    /// Upper bound on in-flight fetches per tier
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Politeness delay before each uncached request, in milliseconds
    #[arg(long, env = "THEMEFOREST_REQUEST_DELAY_MS")]
    pub request_delay_ms: Option<u64>,
}
