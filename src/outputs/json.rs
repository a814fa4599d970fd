//! JSON artifact writer.
//!
//! Artifacts are pretty-printed with a single-space indent, the convention
//! every consumer of the historical `categories.json`/`designs.json` files
//! already expects. Shard filenames embed the category slug, page index,
//! and run id so concurrent and successive runs never collide.

use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{Category, Design};
use crate::utils::slugify;

/// Serialize with the artifact indent convention (one space per level).
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writer for one run's JSON artifacts.
pub struct Sink {
    output_dir: PathBuf,
    run_id: String,
}

impl Sink {
    pub fn new(output_dir: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            run_id: run_id.into(),
        }
    }

    async fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(filename);
        let json = to_pretty_json(value)?;
        fs::write(&path, json).await?;
        info!(path = %path.display(), "Wrote JSON artifact");
        Ok(())
    }

    /// Write the full category collection to `categories.json`.
    #[instrument(level = "info", skip_all, fields(count = categories.len()))]
    pub async fn write_categories(&self, categories: &[Category]) -> Result<(), Box<dyn Error>> {
        self.write_json("categories.json", &categories).await
    }

    /// Write the run-scoped design collection to `designs.json` (single
    /// output mode).
    #[instrument(level = "info", skip_all, fields(count = designs.len()))]
    pub async fn write_designs(&self, designs: &[Design]) -> Result<(), Box<dyn Error>> {
        self.write_json("designs.json", &designs).await
    }

    /// Write one category/page shard (sharded output mode).
    #[instrument(level = "info", skip_all, fields(category = %category_name, page, count = designs.len()))]
    pub async fn write_shard(
        &self,
        category_name: &str,
        page: u32,
        designs: &[Design],
    ) -> Result<(), Box<dyn Error>> {
        let filename = format!("design-{}-{page}-{}.json", slugify(category_name), self.run_id);
        self.write_json(&filename, &designs).await
    }
}
