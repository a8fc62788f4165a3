//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_core::services::DEFAULT_QUERY_TIMEOUT;
use quill_infra::DatabaseConfig;

const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on in-memory repositories.
    pub database: Option<DatabaseConfig>,
    pub query_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 100),
            min_connections: env_or("DB_MIN_CONNECTIONS", 10),
            connect_timeout: DB_CONNECT_TIMEOUT,
        });

        let default_timeout_ms = DEFAULT_QUERY_TIMEOUT.as_millis() as u64;

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 8080),
            database,
            query_timeout: Duration::from_millis(env_or("QUERY_TIMEOUT_MS", default_timeout_ms)),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok().as_deref(), default)
}

/// Parse a raw setting, keeping the default when absent or malformed.
fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
