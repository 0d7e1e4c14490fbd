//! Bounded, completion-ordered concurrent processing.
//!
//! Each item is turned into a future and at most `max_concurrency` of them
//! are in flight at once. Outputs are yielded as soon as each future
//! finishes, so a slow item never holds back faster ones behind it.

use futures::stream::{self, Stream, StreamExt};
use std::future::Future;

/// Runs per-item futures with a fixed number of concurrent slots.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentProcessor {
    max_concurrency: usize,
}

impl ConcurrentProcessor {
    /// Create a processor with `max_concurrency` slots (at least one).
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Number of futures allowed in flight at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Map every item through `f` and stream the outputs in completion order.
    ///
    /// Items are started in iteration order; a new one starts whenever a
    /// slot frees up.
    pub fn process_unordered<I, F, Fut>(&self, items: I, f: F) -> impl Stream<Item = Fut::Output>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future,
    {
        stream::iter(items).map(f).buffer_unordered(self.max_concurrency)
    }
}
