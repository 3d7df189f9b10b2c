//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::handler::{
    create_url, create_url_custom_key, deactivate_url, forward_to_target_url, get_url_info,
    read_root, AppState,
};

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Welcome message
/// - `POST /url` - Creates a short URL with a random key
/// - `POST /url/custom` - Creates a short URL with a custom key
/// - `GET /{key}` - Redirects to the target URL (public endpoint)
/// - `GET /admin/{secret_key}` - Shows the record behind a secret key
/// - `DELETE /admin/{secret_key}` - Deactivates the record
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use url_shortener::database::RedbStore;
/// # use url_shortener::handler::AppState;
/// # use url_shortener::manager::UrlManager;
/// # use url_shortener::route::create_app;
/// let store = RedbStore::open("data.db").unwrap();
/// let state = AppState::new(UrlManager::new(Arc::new(store)), "http://localhost:8080");
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/url", post(create_url))
        .route("/url/custom", post(create_url_custom_key))
        .route("/{key}", get(forward_to_target_url))
        .route(
            "/admin/{secret_key}",
            get(get_url_info).delete(deactivate_url),
        )
        .with_state(state)
}
