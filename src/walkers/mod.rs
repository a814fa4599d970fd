//! Tier walkers for the three-level catalog traversal.
//!
//! The crawl descends three tiers, each fanning out concurrently and joining
//! before its parent proceeds:
//!
//! 1. [`categories`]: visit the catalog root once, extract and filter the
//!    category menu, dispatch one listing traversal per category
//! 2. [`listing`]: walk one category's paginated listing (recursively or by
//!    enumerated page index), dispatch one detail visit per item link
//! 3. [`detail`]: fetch one item detail page, extract its fields, append the
//!    record to the tier's collector
//!
//! # Common Patterns
//!
//! Walkers never propagate errors upward: a failed fetch is logged and its
//! unit of work dropped, leaving siblings untouched. Each tier derives its
//! own fetch session from its parent's, so visited-URL dedup is scoped per
//! tier. Fan-out uses `futures::stream::for_each_concurrent` bounded by the
//! configured concurrency; awaiting the stream is the tier's join.

pub mod categories;
pub mod detail;
pub mod listing;
