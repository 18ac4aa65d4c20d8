use std::str::FromStr;

use anyhow::{Context, Result};

/// Service configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub jobs_api_url: String,
    pub jobs_api_token: Option<String>,
    pub jobs_api_timeout_secs: u64,
    pub page_size: u32,
    pub port: u16,
    /// Browser origins allowed by CORS; empty allows any origin.
    pub cors_origins: Vec<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            jobs_api_url: require_env("JOBS_API_URL")?,
            jobs_api_token: std::env::var("JOBS_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            jobs_api_timeout_secs: env_or("JOBS_API_TIMEOUT_SECS", 30)?,
            page_size: env_or("JOBS_PAGE_SIZE", 100)?,
            port: env_or("PORT", 8080)?,
            cors_origins: split_list(std::env::var("CORS_ALLOWED_ORIGINS").ok().as_deref()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T>(key: &str, raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
        None => Ok(default),
    }
}
