//! Book record handlers.
//!
//! - `GET    /api/books/all/books`: every stored record
//! - `GET    /api/books/get/book/{id}`: one record
//! - `POST   /api/books/create/book`: insert a full record
//! - `PATCH  /api/books/update/{id}`: merge the fields present in the body
//! - `DELETE /api/books/delete/{id}`: remove one record

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use bookdb_core::{BookId, BookPatch, BookRecord, CoreError, StoredBook};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_json_rejection, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CreatedBook {
    pub id: BookId,
}

fn parse_book_id(raw: &str) -> Result<BookId, ApiError> {
    BookId::parse(raw).map_err(|e| ApiError::new("bad_request", e.to_string()))
}

fn validation_error(error: &CoreError) -> ApiError {
    ApiError::new("validation_error", error.to_string())
}

pub(super) async fn list_books(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StoredBook>>>, ApiError> {
    let books = bookdb_db::list_books(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(ApiResponse::data(books)))
}

pub(super) async fn get_book(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<StoredBook>>, ApiError> {
    let id = parse_book_id(&raw_id)?;
    let book = bookdb_db::get_book(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(ApiResponse::data(book)))
}

pub(super) async fn create_book(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<BookRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedBook>>), ApiError> {
    let Json(record) = body.map_err(|e| map_json_rejection(&e))?;
    record.validate().map_err(|e| validation_error(&e))?;

    let id = bookdb_db::create_book(&state.pool, &record)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;

    tracing::info!(request_id = %req_id.0, id = %id, "book created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(CreatedBook { id }).with_message("the book is created")),
    ))
}

pub(super) async fn update_book(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<StoredBook>>, ApiError> {
    let id = parse_book_id(&raw_id)?;
    let Json(patch) = body.map_err(|e| map_json_rejection(&e))?;
    if patch.is_empty() {
        return Err(ApiError::new("validation_error", "no fields to update"));
    }
    patch.validate().map_err(|e| validation_error(&e))?;

    let book = bookdb_db::update_book(&state.pool, &id, &patch)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(
        ApiResponse::data(book).with_message("Data have been updated"),
    ))
}

pub(super) async fn delete_book(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<u64>>, ApiError> {
    let id = parse_book_id(&raw_id)?;
    let deleted = bookdb_db::delete_book(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(
        ApiResponse::data(deleted).with_message("the book is deleted"),
    ))
}
