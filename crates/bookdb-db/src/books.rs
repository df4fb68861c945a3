//! Database operations for the `books` table.

use bookdb_core::{BookDetail, BookId, BookPatch, BookRecord, CoreError, StoredBook};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::DbError;

/// A row from the `books` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRow {
    pub id: i64,
    pub public_id: String,
    pub image_url: String,
    pub title: String,
    pub price: Decimal,
    pub stock_text: String,
    pub detail_page_url: String,
    pub upc: String,
    pub description: String,
    pub product_type: String,
    /// The schema defines this as `INTEGER NOT NULL CHECK (>= 0)`.
    pub availability_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for StoredBook {
    type Error = CoreError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let availability_count =
            u32::try_from(row.availability_count).map_err(|e| CoreError::InvalidRecord {
                field: "detail.availability_count",
                reason: e.to_string(),
            })?;
        Ok(StoredBook {
            id: BookId::parse(&row.public_id)?,
            record: BookRecord {
                image_url: row.image_url,
                title: row.title,
                price: row.price,
                stock_text: row.stock_text,
                detail_page_url: row.detail_page_url,
                detail: BookDetail {
                    upc: row.upc,
                    description: row.description,
                    product_type: row.product_type,
                    availability_count,
                },
            },
        })
    }
}

fn count_to_db(count: u32) -> Result<i32, DbError> {
    i32::try_from(count).map_err(|e| {
        DbError::InvalidRow(CoreError::InvalidRecord {
            field: "detail.availability_count",
            reason: e.to_string(),
        })
    })
}

fn into_stored(rows: Vec<BookRow>) -> Result<Vec<StoredBook>, DbError> {
    rows.into_iter()
        .map(|row| StoredBook::try_from(row).map_err(DbError::from))
        .collect()
}

async fn insert_one(conn: &mut PgConnection, record: &BookRecord) -> Result<BookId, DbError> {
    let id = BookId::generate();
    sqlx::query(
        "INSERT INTO books (public_id, image_url, title, price, stock_text, detail_page_url, \
                            upc, description, product_type, availability_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(id.as_str())
    .bind(&record.image_url)
    .bind(&record.title)
    .bind(record.price)
    .bind(&record.stock_text)
    .bind(&record.detail_page_url)
    .bind(&record.detail.upc)
    .bind(&record.detail.description)
    .bind(&record.detail.product_type)
    .bind(count_to_db(record.detail.availability_count)?)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Inserts every record of a crawl batch inside one transaction.
///
/// Returns the generated ids in input order. If any insert fails the
/// transaction is rolled back and no record of the batch remains.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails.
pub async fn insert_batch(pool: &PgPool, records: &[BookRecord]) -> Result<Vec<BookId>, DbError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(records.len());
    for record in records {
        ids.push(insert_one(&mut *tx, record).await?);
    }
    tx.commit().await?;

    tracing::debug!(count = ids.len(), "inserted book batch");
    Ok(ids)
}

/// Inserts a single record and returns its new id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_book(pool: &PgPool, record: &BookRecord) -> Result<BookId, DbError> {
    let mut conn = pool.acquire().await?;
    insert_one(&mut conn, record).await
}

/// Returns every stored record in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_books(pool: &PgPool) -> Result<Vec<StoredBook>, DbError> {
    let rows = sqlx::query_as::<_, BookRow>(
        "SELECT id, public_id, image_url, title, price, stock_text, detail_page_url, \
                upc, description, product_type, availability_count, created_at, updated_at \
         FROM books \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    into_stored(rows)
}

/// Fetches one record by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no record has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_book(pool: &PgPool, id: &BookId) -> Result<StoredBook, DbError> {
    let row = sqlx::query_as::<_, BookRow>(
        "SELECT id, public_id, image_url, title, price, stock_text, detail_page_url, \
                upc, description, product_type, availability_count, created_at, updated_at \
         FROM books \
         WHERE public_id = $1",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(StoredBook::try_from(row)?)
}

/// Applies a partial update and returns the record as stored afterwards.
///
/// Only fields present in `patch` are written; the rest keep their stored
/// values. The caller validates the patch.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no record has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_book(
    pool: &PgPool,
    id: &BookId,
    patch: &BookPatch,
) -> Result<StoredBook, DbError> {
    let availability_count = patch
        .detail
        .availability_count
        .map(count_to_db)
        .transpose()?;

    let row = sqlx::query_as::<_, BookRow>(
        "UPDATE books SET \
             image_url = COALESCE($2, image_url), \
             title = COALESCE($3, title), \
             price = COALESCE($4, price), \
             stock_text = COALESCE($5, stock_text), \
             detail_page_url = COALESCE($6, detail_page_url), \
             upc = COALESCE($7, upc), \
             description = COALESCE($8, description), \
             product_type = COALESCE($9, product_type), \
             availability_count = COALESCE($10, availability_count), \
             updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING id, public_id, image_url, title, price, stock_text, detail_page_url, \
                   upc, description, product_type, availability_count, created_at, updated_at",
    )
    .bind(id.as_str())
    .bind(patch.image_url.as_deref())
    .bind(patch.title.as_deref())
    .bind(patch.price)
    .bind(patch.stock_text.as_deref())
    .bind(patch.detail_page_url.as_deref())
    .bind(patch.detail.upc.as_deref())
    .bind(patch.detail.description.as_deref())
    .bind(patch.detail.product_type.as_deref())
    .bind(availability_count)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(StoredBook::try_from(row)?)
}

/// Deletes one record and returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no record has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_book(pool: &PgPool, id: &BookId) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM books WHERE public_id = $1")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(result.rows_affected())
}
