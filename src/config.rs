//! Crawl configuration: defaults, YAML file loading, and CLI overrides.
//!
//! Configuration resolves in three layers, later layers winning:
//! 1. Built-in defaults (the production ThemeForest crawl)
//! 2. An optional YAML config file (`--config crawl.yaml`)
//! 3. Individual CLI flags / environment variables
//!
//! The pagination policy and output mode are deliberate knobs rather than
//! hardcoded behavior: both traversal styles shipped at different points in
//! this tool's history and both remain supported.

use clap::ValueEnum;
use serde::Deserialize;
use std::error::Error;
use tracing::info;

use crate::cli::Cli;

/// How a category listing discovers its sibling pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaginationPolicy {
    /// Follow "next page" navigation links recursively until none match the
    /// category's listing path. Termination comes from the fetch session's
    /// visited-URL dedup.
    Recursive,
    /// Read the last page number from the pagination nav and dispatch one
    /// traversal per page index `1..=N` via `page=` substitution.
    /// A non-numeric nav element means zero pages.
    Enumerated,
}

/// How extracted designs are grouped into output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One run-scoped `designs.json` accumulated across all categories.
    Single,
    /// One `design-<category>-<page>-<runId>.json` per category/page pair,
    /// flushed as soon as that page's detail fetches have joined. Categories
    /// are walked serially in this mode.
    Sharded,
}

/// Resolved configuration for one crawl run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Site root, scheme included.
    pub base_url: String,
    /// Path of the listing the category menu is read from.
    pub start_path: String,
    /// Hosts the fetch session is allowed to touch.
    pub allowed_domains: Vec<String>,
    /// Menu entries whose href starts with any of these prefixes are noise
    /// (site search, the root listing itself) and are dropped.
    pub skip_prefixes: Vec<String>,
    /// Directory for the URL-keyed response cache.
    pub cache_dir: String,
    /// Append the run id to `cache_dir` so each run caches independently.
    pub run_scoped_cache: bool,
    /// Directory the JSON artifacts are written to.
    pub output_dir: String,
    pub pagination: PaginationPolicy,
    pub output: OutputMode,
    /// Upper bound on in-flight fetches per tier.
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    /// Politeness delay before each uncached request, in milliseconds.
    pub request_delay_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://themeforest.net".to_string(),
            start_path: "/category/wordpress?sort=date".to_string(),
            allowed_domains: vec![
                "themeforest.net".to_string(),
                "www.themeforest.net".to_string(),
            ],
            skip_prefixes: vec![
                "/search?sort".to_string(),
                "/category/wordpress?sort".to_string(),
            ],
            cache_dir: "./themeforest_cache".to_string(),
            run_scoped_cache: false,
            output_dir: ".".to_string(),
            pagination: PaginationPolicy::Enumerated,
            output: OutputMode::Single,
            concurrency: 12,
            request_timeout_secs: 30,
            request_delay_ms: 0,
        }
    }
}

impl CrawlConfig {
    /// Load configuration from an optional YAML file, then apply CLI
    /// overrides on top.
    pub fn resolve(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut config = match &cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let parsed: CrawlConfig = serde_yaml::from_str(&raw)?;
                info!(%path, "Loaded crawl config file");
                parsed
            }
            None => CrawlConfig::default(),
        };

        if let Some(base_url) = &cli.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(start_path) = &cli.start_path {
            config.start_path = start_path.clone();
        }
        if let Some(output_dir) = &cli.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(cache_dir) = &cli.cache_dir {
            config.cache_dir = cache_dir.clone();
        }
        if cli.run_scoped_cache {
            config.run_scoped_cache = true;
        }
        if let Some(pagination) = cli.pagination {
            config.pagination = pagination;
        }
        if let Some(output) = cli.output_mode {
            config.output = output;
        }
        if let Some(concurrency) = cli.concurrency {
            config.concurrency = concurrency.max(1);
        }
        if let Some(delay) = cli.request_delay_ms {
            config.request_delay_ms = delay;
        }

        Ok(config)
    }

    /// Absolute URL of the catalog root listing.
    pub fn root_url(&self) -> String {
        format!("{}{}", self.base_url, self.start_path)
    }
}
