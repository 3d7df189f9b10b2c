//! HTTP request handlers for the URL shortener API
//!
//! Handlers translate requests into [`UrlManager`] calls and render the
//! results. All error mapping to status codes happens through
//! [`ApiError`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect},
    Json,
};
use std::sync::Arc;

use crate::error::{ApiError, UrlError};
use crate::manager::UrlManager;
use crate::model::{CreateCustomUrlRequest, CreateUrlRequest, DetailMessage, UrlInfo};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: UrlManager,

    /// Public base URL used to build links, without trailing `/`
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(manager: UrlManager, base_url: &str) -> Self {
        Self {
            manager,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Full URL of the requested resource, used in 404 messages
    fn requested_url(&self, uri: &Uri) -> String {
        let path = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
        format!("{}{}", self.base_url, path)
    }

    /// Runs a manager call on the blocking thread pool.
    ///
    /// redb transactions commit synchronously, so they stay off the async
    /// workers. A dropped request does not cancel the spawned call, so a
    /// started mutation always completes.
    async fn with_manager<T, F>(&self, uri: &Uri, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(UrlManager) -> Result<T, UrlError> + Send + 'static,
        T: Send + 'static,
    {
        let manager = self.manager.clone();
        tokio::task::spawn_blocking(move || call(manager))
            .await
            .map_err(|err| {
                tracing::error!("Record store task failed: {}", err);
                ApiError::Internal
            })?
            .map_err(|err| ApiError::from_url_error(err, &self.requested_url(uri)))
    }
}

/// `GET /` - static welcome message
pub async fn read_root() -> impl IntoResponse {
    Json("Welcome to URL Shortener API")
}

/// Creates a new short URL under a random key
///
/// # Request Body
///
/// ```json
/// { "targetUrl": "https://example.com/very/long/url" }
/// ```
///
/// # Response
///
/// - **201 Created** - [`UrlInfo`] of the new record
/// - **400 Bad Request** - URL is not valid
pub async fn create_url(
    State(state): State<AppState>,
    uri: Uri,
    payload: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let record = state
        .with_manager(&uri, move |manager| manager.create_short_url(&payload.target_url))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UrlInfo::from_record(&record, &state.base_url)),
    ))
}

/// Creates a new short URL under a caller-chosen key
///
/// # Request Body
///
/// ```json
/// { "targetUrl": "https://example.com", "key": "my-link" }
/// ```
///
/// # Response
///
/// - **201 Created** - [`UrlInfo`] of the new record
/// - **400 Bad Request** - URL or key is not valid, or key already used
pub async fn create_url_custom_key(
    State(state): State<AppState>,
    uri: Uri,
    payload: Result<Json<CreateCustomUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let record = state
        .with_manager(&uri, move |manager| {
            manager.create_short_url_with_custom_key(&payload.target_url, &payload.key)
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UrlInfo::from_record(&record, &state.base_url)),
    ))
}

/// Redirects a short URL to its target and counts the click
///
/// # Response
///
/// - **307 Temporary Redirect** - to the target URL
/// - **404 Not Found** - key unknown or deactivated
///
/// 307 rather than 301 keeps browsers from caching the redirect, so every
/// visit reaches the counter.
pub async fn forward_to_target_url(
    Path(key): Path<String>,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .with_manager(&uri, move |manager| manager.resolve(&key))
        .await?;

    Ok(Redirect::temporary(&record.target_url))
}

/// `GET /admin/{secret_key}` - [`UrlInfo`] of the record, no side effects
pub async fn get_url_info(
    Path(secret_key): Path<String>,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<UrlInfo>, ApiError> {
    let record = state
        .with_manager(&uri, move |manager| manager.admin_info(&secret_key))
        .await?;

    Ok(Json(UrlInfo::from_record(&record, &state.base_url)))
}

/// `DELETE /admin/{secret_key}` - deactivates the record
pub async fn deactivate_url(
    Path(secret_key): Path<String>,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<DetailMessage>, ApiError> {
    let record = state
        .with_manager(&uri, move |manager| manager.deactivate(&secret_key))
        .await?;

    Ok(Json(DetailMessage {
        detail: format!(
            "Successfully deactive shortened URL for '{}'",
            record.target_url
        ),
    }))
}
