//! Random key generation and custom key validation

use rand::{distr::Alphanumeric, Rng};

/// Length of generated public keys
pub const KEY_LENGTH: usize = 5;

/// Length of generated secret (admin) keys
pub const SECRET_KEY_LENGTH: usize = 8;

/// Upper bound on generate-and-insert attempts before giving up
pub const MAX_KEY_ATTEMPTS: usize = 16;

/// Longest custom key accepted from callers
pub const MAX_CUSTOM_KEY_LENGTH: usize = 64;

// Single-segment paths already routed to the API
const RESERVED_KEYS: [&str; 2] = ["admin", "url"];

/// Returns a uniformly random alphanumeric string of `length` characters.
///
/// Uniqueness is not guaranteed here; the record store rejects collisions
/// and the caller retries.
pub fn generate_key(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Same alphabet as [`generate_key`], used for admin credentials.
pub fn generate_secret_key(length: usize) -> String {
    generate_key(length)
}

/// Checks that a caller-supplied key is usable as a single path segment.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_CUSTOM_KEY_LENGTH
        && !RESERVED_KEYS.contains(&key)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_have_requested_length_and_alphabet() {
        let key = generate_key(KEY_LENGTH);
        assert_eq!(key.len(), KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));

        let secret = generate_secret_key(SECRET_KEY_LENGTH);
        assert_eq!(secret.len(), SECRET_KEY_LENGTH);
    }

    #[test]
    fn custom_key_rules() {
        assert!(is_valid_key("my-link_2"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("has space"));
        assert!(!is_valid_key("a/b"));
        assert!(!is_valid_key("admin"));
        assert!(!is_valid_key(&"x".repeat(MAX_CUSTOM_KEY_LENGTH + 1)));
    }
}
