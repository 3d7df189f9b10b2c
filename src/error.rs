//! Error types for the URL shortener
//!
//! Three layers:
//! - [`StorageError`] - failures of the record store (redb, encoding, key space)
//! - [`UrlError`] - domain failures returned by the record manager
//! - [`ApiError`] - what the HTTP layer renders to the client

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of the underlying record store
///
/// Never user-correctable. The current operation is aborted and nothing is
/// retried.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("no free key found after {0} attempts")]
    KeySpaceExhausted(usize),
}

/// Domain errors returned by [`crate::manager::UrlManager`]
#[derive(Debug, Error)]
pub enum UrlError {
    /// Malformed target URL or custom key
    #[error("{0}")]
    Validation(String),

    /// Custom key already used by an active record
    #[error("{0}")]
    KeyConflict(String),

    /// No active record matches the key or secret key
    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors rendered by the HTTP handlers
///
/// Every variant is rendered as `{"detail": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InvalidBody(JsonRejection),
    Internal,
}

impl ApiError {
    /// Maps a domain error to its HTTP form.
    ///
    /// `missing` is the resource named in the 404 message when the record
    /// does not exist.
    pub fn from_url_error(err: UrlError, missing: &str) -> Self {
        match err {
            UrlError::Validation(message) | UrlError::KeyConflict(message) => {
                ApiError::BadRequest(message)
            }
            UrlError::NotFound => ApiError::NotFound(format!("URL '{}' doesn't exist", missing)),
            UrlError::Storage(err) => {
                tracing::error!("Record store failure: {}", err);
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
