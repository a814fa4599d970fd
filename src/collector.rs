//! Concurrency-safe aggregation of extracted designs.
//!
//! Detail fetches within a tier run concurrently and all append to one
//! collection, so appends go through a mutex: many concurrent writers, one
//! eventual reader. The reader ([`DesignCollector::drain`]) runs strictly
//! after the tier's join, so it never races an append.

use crate::models::Design;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Clone-able handle to a tier's append-only design collection.
///
/// Clones share the same underlying collection; hand one to each
/// concurrently dispatched detail fetch. Records are never mutated or
/// removed once pushed.
#[derive(Clone, Default)]
pub struct DesignCollector {
    inner: Arc<Mutex<Vec<Design>>>,
}

impl DesignCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one extracted design.
    pub async fn push(&self, design: Design) {
        self.inner.lock().await.push(design);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Take everything collected so far. Call only after the owning tier's
    /// join; a page-scoped collector is drained once per page flush.
    pub async fn drain(&self) -> Vec<Design> {
        std::mem::take(&mut *self.inner.lock().await)
    }
}
