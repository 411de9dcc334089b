use anyhow::{Context, Result};
use std::str::FromStr;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Overrides the database named in `DATABASE_URL` when set.
    pub database_name: Option<String>,
    pub db_max_connections: u32,
    pub redis_url: String,
    pub session_cookie: String,
    pub session_key_prefix: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_name: std::env::var("DATABASE_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            redis_url: require_env("REDIS_URL")?,
            session_cookie: std::env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| "session_token".to_string()),
            session_key_prefix: std::env::var("SESSION_KEY_PREFIX")
                .unwrap_or_else(|_| "session:".to_string()),
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
