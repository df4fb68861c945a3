mod books;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Success envelope: `{"status": "Ok", "message"?: ..., "data"?: ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            status: "Ok",
            message: None,
            data: Some(data),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "Ok",
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Error envelope: `{"status": "Error", "message": ...}`. The code picks the
/// HTTP status and is not serialized.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: &'static str,
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            status: "Error",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: &str, error: &bookdb_db::DbError) -> ApiError {
    match error {
        bookdb_db::DbError::NotFound => ApiError::new("not_found", "Book not found"),
        other => {
            tracing::error!(request_id, error = %other, "database query failed");
            ApiError::new("internal_error", "database query failed")
        }
    }
}

pub(super) fn map_json_rejection(rejection: &JsonRejection) -> ApiError {
    ApiError::new("bad_request", format!("invalid request body: {}", rejection.body_text()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn books_router() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(home))
        .route("/api/books/", get(home))
        .route("/api/books/all/books", get(books::list_books))
        .route("/api/books/get/book/{id}", get(books::get_book))
        .route("/api/books/create/book", post(books::create_book))
        .route("/api/books/update/{id}", patch(books::update_book))
        .route("/api/books/delete/{id}", delete(books::delete_book))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(books_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn home() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("bookdb API is running"))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match bookdb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::data(HealthData {
                status: "ok",
                database: "ok",
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::data(HealthData {
                    status: "degraded",
                    database: "unavailable",
                })),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
