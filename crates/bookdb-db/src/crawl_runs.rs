//! Database operations for `crawl_runs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `crawl_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrawlRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub start_url: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pages_processed: i32,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new crawl run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_crawl_run(
    pool: &PgPool,
    start_url: &str,
    trigger_source: &str,
) -> Result<CrawlRunRow, DbError> {
    let row = sqlx::query_as::<_, CrawlRunRow>(
        "INSERT INTO crawl_runs (public_id, start_url, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING id, public_id, start_url, trigger_source, status, started_at, \
                   completed_at, pages_processed, records_processed, error_message, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(start_url)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a queued run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run is not queued,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_crawl_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crawl_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlRunTransition {
            id,
            expected_status: "queued",
        });
    }
    Ok(())
}

/// Marks a running run as `succeeded` with its page and record counts.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_crawl_run(
    pool: &PgPool,
    id: i64,
    pages_processed: i32,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crawl_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             pages_processed = $1, records_processed = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(pages_processed)
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Marks a queued or running run as `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run already
/// finished, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_crawl_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crawl_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status IN ('queued', 'running')",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_crawl_run(pool: &PgPool, id: i64) -> Result<CrawlRunRow, DbError> {
    sqlx::query_as::<_, CrawlRunRow>(
        "SELECT id, public_id, start_url, trigger_source, status, started_at, \
                completed_at, pages_processed, records_processed, error_message, created_at \
         FROM crawl_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_crawl_runs(pool: &PgPool, limit: i64) -> Result<Vec<CrawlRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CrawlRunRow>(
        "SELECT id, public_id, start_url, trigger_source, status, started_at, \
                completed_at, pages_processed, records_processed, error_message, created_at \
         FROM crawl_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
