//! Utility functions for run identification, filename slugging, and file
//! system checks.

use chrono::Local;
use rand::{Rng, rng};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Generate the identifier for one crawl run.
///
/// The id namespaces sharded output filenames (and the cache directory when
/// run-scoped caching is enabled) so successive runs never clobber each
/// other. Format: `YYYYmmddHHMMSS-xxxxxx` where the suffix is six random
/// alphanumerics.
pub fn run_id() -> String {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let suffix: String = rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{stamp}-{}", suffix.to_lowercase())
}

/// Convert a category name to a filename-safe slug.
///
/// Lowercases, strips everything that is not alphanumeric, space, or hyphen,
/// and replaces spaces with hyphens. Used for shard filenames, so
/// "Blog / Magazine" becomes `blog--magazine`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Creative!"), "creative");
/// ```
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
