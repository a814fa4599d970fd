//! Output generation for the crawl's JSON artifacts.
//!
//! One crawl run produces two artifact kinds under the output directory:
//!
//! ```text
//! output_dir/
//! ├── categories.json                          # always
//! ├── designs.json                             # single output mode
//! └── design-<category>-<page>-<runId>.json    # sharded output mode, per page
//! ```
//!
//! Write failures are logged by callers and never abort the run; a failed
//! shard is simply absent.

pub mod json;

pub use json::Sink;
