//! Data models for the URL shortener application
//!
//! This module defines the stored record, the request payloads and the
//! response views. Views are built explicitly from a record so internal
//! fields never reach a client by accident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a URL record stored in the database
///
/// Records are never removed; deactivation flips `is_active` and the record
/// is treated as nonexistent from then on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// Internal identifier, assigned by the store
    pub id: u64,

    /// Public key used in redirect paths (e.g., "aB3xZ" or a custom key)
    pub key: String,

    /// Admin credential for this record
    pub secret_key: String,

    /// The URL visitors are redirected to, exactly as submitted
    pub target_url: String,

    /// Whether the record is live
    pub is_active: bool,

    /// Number of successful redirects
    #[serde(default)]
    pub clicks: u64,

    /// Timestamp when this URL record was created
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the record manager when inserting a record
///
/// The store assigns `id`, `created_at`, and the initial state.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub key: String,
    pub secret_key: String,
    pub target_url: String,
}

/// Request payload for `POST /url`
///
/// # Example
/// ```json
/// { "targetUrl": "https://example.com/very/long/url" }
/// ```
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    #[serde(alias = "target_url")]
    pub target_url: String,
}

/// Request payload for `POST /url/custom`
///
/// # Example
/// ```json
/// { "targetUrl": "https://example.com", "key": "my-link" }
/// ```
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomUrlRequest {
    #[serde(alias = "target_url")]
    pub target_url: String,

    pub key: String,
}

/// Public view of a record returned by the create and admin endpoints
///
/// # Example
/// ```json
/// {
///   "targetUrl": "https://example.com",
///   "isActive": true,
///   "clicks": 0,
///   "url": "http://localhost:8080/aB3xZ",
///   "adminUrl": "http://localhost:8080/admin/Qw7kP2sL"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UrlInfo {
    pub target_url: String,
    pub is_active: bool,
    pub clicks: u64,
    pub url: String,
    pub admin_url: String,
}

impl UrlInfo {
    /// Builds the view for `record`, deriving both links from `base_url`.
    pub fn from_record(record: &UrlRecord, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            target_url: record.target_url.clone(),
            is_active: record.is_active,
            clicks: record.clicks,
            url: format!("{}/{}", base, record.key),
            admin_url: format!("{}/admin/{}", base, record.secret_key),
        }
    }
}

/// `{"detail": "..."}` body used for confirmations
#[derive(Serialize, Deserialize, Debug)]
pub struct DetailMessage {
    pub detail: String,
}
