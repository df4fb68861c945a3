//! Boundary between a finished crawl and whatever persists its batch.

use std::future::Future;

use thiserror::Error;

use crate::BookRecord;

/// Write failure reported by a [`BookSink`]. The batch is treated as not
/// inserted at all.
#[derive(Debug, Error)]
#[error("failed to persist batch of {attempted} records: {source}")]
pub struct PersistenceError {
    pub attempted: usize,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl PersistenceError {
    pub fn new(
        attempted: usize,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            attempted,
            source: source.into(),
        }
    }
}

/// Accepts the complete batch of a successful crawl in a single hand-off.
///
/// Implementations must be all-or-nothing: on `Err` no record of the batch
/// may remain persisted.
pub trait BookSink {
    /// Persists every record and returns how many were inserted.
    fn insert_batch(
        &self,
        records: Vec<BookRecord>,
    ) -> impl Future<Output = Result<usize, PersistenceError>> + Send;
}
