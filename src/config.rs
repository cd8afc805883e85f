//! Configuration management for AnalystAI.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `APP_NAME` - Optional. Application name used in logs. Defaults to `AnalystAI`.
//! - `APP_VERSION` - Optional. Application version string. Defaults to `0.0.1`.
//! - `LOG_DIR` - Optional. Directory for per-component log files. Defaults to `logs`.
//! - `LOG_MAX_BYTES` - Optional. File size that triggers log rotation. Defaults to `10485760`.
//! - `LOG_BACKUP_COUNT` - Optional. Rotated files retained per logger. Defaults to `3`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5000`.
//!
//! A `.env` file in the working directory is consulted before the
//! environment is read; it only fills variables that are not already set,
//! so real environment variables always win.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application settings, immutable after construction.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Application name used in logs
    pub app_name: String,

    /// Application version string
    pub app_version: String,

    /// OpenRouter API key
    pub api_key: String,

    /// Directory for per-component log files
    pub log_dir: PathBuf,

    /// File size in bytes that triggers log rotation (0 disables rotation)
    pub log_max_bytes: u64,

    /// Number of rotated log files retained per logger
    pub log_backup_count: usize,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

static SETTINGS: LazyLock<Result<Settings, ConfigError>> = LazyLock::new(|| {
    // Overlay fills variables the environment does not already set.
    let _ = dotenvy::dotenv();
    Settings::from_env()
});

/// Return the process-wide settings, loading them on first call.
///
/// The environment is read at most once per process; every caller observes
/// the same instance for the process lifetime, even if the environment
/// changes afterwards. Concurrent first calls block on a single
/// construction rather than racing.
///
/// # Errors
///
/// Returns the `ConfigError` produced by the one-time load. The error is
/// stored alongside the cache, so a failed load is reported consistently
/// to every caller instead of being retried.
pub fn get_settings() -> Result<&'static Settings, ConfigError> {
    match &*SETTINGS {
        Ok(settings) => Ok(settings),
        Err(err) => Err(err.clone()),
    }
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not
    /// set or is blank, and `ConfigError::InvalidValue` if a numeric
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    ///
    /// `from_env` routes through this; tests inject a fixed map instead of
    /// touching the process environment.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let app_name = lookup("APP_NAME").unwrap_or_else(|| "AnalystAI".to_string());

        let app_version = lookup("APP_VERSION").unwrap_or_else(|| "0.0.1".to_string());

        let log_dir = lookup("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        let log_max_bytes = parse_or_default(&lookup, "LOG_MAX_BYTES", 10 * 1024 * 1024)?;

        let log_backup_count = parse_or_default(&lookup, "LOG_BACKUP_COUNT", 3)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_or_default(&lookup, "PORT", 5000)?;

        Ok(Self {
            app_name,
            app_version,
            api_key,
            log_dir,
            log_max_bytes,
            log_backup_count,
            host,
            port,
        })
    }

    /// Create settings with custom values (useful for testing).
    pub fn new(api_key: String, log_dir: PathBuf) -> Self {
        Self {
            app_name: "AnalystAI".to_string(),
            app_version: "0.0.1".to_string(),
            api_key,
            log_dir,
            log_max_bytes: 10 * 1024 * 1024,
            log_backup_count: 3,
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}
