//! Business rules for URL records
//!
//! [`UrlManager`] validates input, assigns keys, counts clicks and
//! deactivates records. It is the only writer of the record store.

use std::sync::Arc;

use url::Url;

use crate::database::{InsertOutcome, RecordStore};
use crate::error::{StorageError, UrlError};
use crate::keygen::{
    generate_key, generate_secret_key, is_valid_key, KEY_LENGTH, MAX_KEY_ATTEMPTS,
    SECRET_KEY_LENGTH,
};
use crate::model::{NewUrlRecord, UrlRecord};

const INVALID_URL: &str = "Your provided URL is not valid";
const INVALID_KEY: &str = "Your provided key is not valid";
const KEY_ALREADY_USED: &str = "Key already used, please use another key";

/// Record manager over an injected [`RecordStore`]
#[derive(Clone)]
pub struct UrlManager {
    store: Arc<dyn RecordStore>,
}

impl UrlManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates a record for `target_url` under a freshly generated key.
    ///
    /// The returned record carries the secret key; this is the only time
    /// it is handed out besides the admin endpoints.
    pub fn create_short_url(&self, target_url: &str) -> Result<UrlRecord, UrlError> {
        validate_target_url(target_url)?;

        let mut key = generate_key(KEY_LENGTH);
        let mut secret_key = generate_secret_key(SECRET_KEY_LENGTH);

        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let new_record = NewUrlRecord {
                key: key.clone(),
                secret_key: secret_key.clone(),
                target_url: target_url.to_string(),
            };

            match self.store.insert(new_record)? {
                InsertOutcome::Inserted(record) => {
                    tracing::info!("Created short URL '{}' for {}", record.key, record.target_url);
                    return Ok(record);
                }
                InsertOutcome::KeyTaken => {
                    tracing::warn!("Generated key collided (attempt {})", attempt);
                    key = generate_key(KEY_LENGTH);
                }
                InsertOutcome::SecretKeyTaken => {
                    tracing::warn!("Generated secret key collided (attempt {})", attempt);
                    secret_key = generate_secret_key(SECRET_KEY_LENGTH);
                }
            }
        }

        tracing::error!("Could not persist new URL. Exhausted all key generation attempts");
        Err(StorageError::KeySpaceExhausted(MAX_KEY_ATTEMPTS).into())
    }

    /// Creates a record for `target_url` under the caller-chosen `key`.
    ///
    /// Fails with [`UrlError::KeyConflict`] if an active record uses `key`.
    /// Keys of deactivated records may be taken again.
    pub fn create_short_url_with_custom_key(
        &self,
        target_url: &str,
        key: &str,
    ) -> Result<UrlRecord, UrlError> {
        validate_target_url(target_url)?;
        if !is_valid_key(key) {
            return Err(UrlError::Validation(INVALID_KEY.to_string()));
        }

        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let new_record = NewUrlRecord {
                key: key.to_string(),
                secret_key: generate_secret_key(SECRET_KEY_LENGTH),
                target_url: target_url.to_string(),
            };

            match self.store.insert(new_record)? {
                InsertOutcome::Inserted(record) => {
                    tracing::info!("Created custom short URL '{}' for {}", record.key, record.target_url);
                    return Ok(record);
                }
                InsertOutcome::KeyTaken => {
                    tracing::debug!("Custom key '{}' already in use", key);
                    return Err(UrlError::KeyConflict(KEY_ALREADY_USED.to_string()));
                }
                InsertOutcome::SecretKeyTaken => {
                    tracing::warn!("Generated secret key collided (attempt {})", attempt);
                }
            }
        }

        tracing::error!("Could not persist custom URL. Exhausted all secret key attempts");
        Err(StorageError::KeySpaceExhausted(MAX_KEY_ATTEMPTS).into())
    }

    /// Counts one visit of `key` and returns the record to redirect to.
    pub fn resolve(&self, key: &str) -> Result<UrlRecord, UrlError> {
        match self.store.increment_clicks(key)? {
            Some(record) => {
                tracing::debug!("Resolved '{}' ({} clicks)", key, record.clicks);
                Ok(record)
            }
            None => {
                tracing::debug!("No active URL for key '{}'", key);
                Err(UrlError::NotFound)
            }
        }
    }

    /// Returns the active record owning `secret_key`.
    pub fn admin_info(&self, secret_key: &str) -> Result<UrlRecord, UrlError> {
        self.store
            .find_by_secret_key(secret_key)?
            .ok_or(UrlError::NotFound)
    }

    /// Deactivates the record owning `secret_key` and returns it as it was
    /// before deactivation. There is no way back.
    pub fn deactivate(&self, secret_key: &str) -> Result<UrlRecord, UrlError> {
        let record = self
            .store
            .deactivate(secret_key)?
            .ok_or(UrlError::NotFound)?;
        tracing::info!("Deactivated short URL '{}' for {}", record.key, record.target_url);
        Ok(record)
    }
}

/// Accepts absolute http(s)/ftp URLs with a host.
///
/// The URL parser silently drops tabs and newlines and trims surrounding
/// spaces, but the stored string is the raw input and ends up in the
/// `Location` header. Only printable ASCII is accepted, so anything a
/// header cannot carry never reaches the store. Other characters must be
/// percent-encoded by the caller.
fn validate_target_url(target_url: &str) -> Result<(), UrlError> {
    if !target_url.chars().all(|c| c.is_ascii_graphic()) {
        return Err(UrlError::Validation(INVALID_URL.to_string()));
    }

    let valid = Url::parse(target_url)
        .map(|url| {
            matches!(url.scheme(), "http" | "https" | "ftp")
                && url.host_str().is_some_and(|host| !host.is_empty())
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(UrlError::Validation(INVALID_URL.to_string()))
    }
}
