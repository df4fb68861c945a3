use bookdb_core::{BookRecord, BookSink, PersistenceError};
use sqlx::PgPool;

use crate::books::insert_batch;

/// Postgres-backed [`BookSink`]: the whole batch goes in one transaction.
#[derive(Debug, Clone)]
pub struct PgBookSink {
    pool: PgPool,
}

impl PgBookSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl BookSink for PgBookSink {
    async fn insert_batch(&self, records: Vec<BookRecord>) -> Result<usize, PersistenceError> {
        match insert_batch(&self.pool, &records).await {
            Ok(ids) => {
                tracing::info!(count = ids.len(), "inserted records");
                Ok(ids.len())
            }
            Err(e) => Err(PersistenceError::new(records.len(), e)),
        }
    }
}
