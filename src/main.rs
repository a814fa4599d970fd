//! # ThemeForest Crawler
//!
//! A batch crawler that walks the ThemeForest catalog and exports category
//! and design metadata as JSON artifacts.
//!
//! ## Features
//!
//! - Discovers categories from the catalog's category filter menu
//! - Walks each category's paginated listing (recursive link-following or
//!   enumerated page indices, configurable)
//! - Fetches every item detail page and extracts ~20 metadata fields
//! - Caches responses on disk keyed by URL, restricted to allowed domains
//! - Writes `categories.json` plus either one `designs.json` or per-page
//!   design shards
//!
//! ## Usage
//!
//! ```sh
//! themeforest_crawler -o ./artifacts --output-mode sharded
//! ```
//!
//! ## Architecture
//!
//! The crawl is a three-tier traversal, each tier fanning out concurrently
//! and joining before its parent proceeds:
//! 1. **Categories**: visit the catalog root, extract and filter the menu
//! 2. **Listings**: walk each category's pages, discover item links
//! 3. **Details**: fetch each item page, extract one record, aggregate
//!
//! Every error below startup is handled where it occurs: failed fetches are
//! logged and dropped, so the worst outcome is an incomplete artifact,
//! never a crash.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collector;
mod config;
mod extract;
mod fetch;
mod models;
mod outputs;
mod utils;
mod walkers;

use cli::Cli;
use config::CrawlConfig;
use fetch::{FetchSession, SessionConfig};
use outputs::Sink;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("themeforest_crawler starting up");

    // Parse CLI and resolve configuration layers
    let args = Cli::parse();
    let config = CrawlConfig::resolve(&args)?;
    debug!(?config, "Resolved crawl configuration");

    // Early check: ensure the output dir is writable before fetching anything
    if let Err(e) = utils::ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let run_id = utils::run_id();
    info!(%run_id, base_url = %config.base_url, "Crawl run initialized");

    let session = FetchSession::new(SessionConfig::for_run(&config, &run_id))?;
    let sink = Sink::new(config.output_dir.clone(), run_id);

    // ---- Crawl ----
    let categories = walkers::categories::walk_categories(&session, &config, &sink).await;

    // Design artifacts are flushed by their owning tiers; the category
    // collection is written here once the whole traversal has joined.
    if let Err(e) = sink.write_categories(&categories).await {
        error!(error = %e, "Failed to write categories artifact");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        categories = categories.len(),
        "Crawl complete"
    );

    Ok(())
}
