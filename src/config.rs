//! Process configuration read from the environment
//!
//! Variables (a `.env` file is loaded first when present):
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to database file (default: "data.db")
//! - `BASE_URL` - Public base used to build `url` and `adminUrl`
//!   (default: "http://localhost:{PORT}")

use std::env;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "data.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Never ends with `/`
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid PORT '{}', falling back to {}", value, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let base_url = env::var("BASE_URL")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        Self {
            port,
            database_url,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}
