//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://transport_management.db?mode=rwc";
pub const DEFAULT_UPLOAD_FOLDER: &str = "storage";
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
pub const DEFAULT_FILE_MAX_AGE_DAYS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub storage_root: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub max_content_length: usize,
    pub file_max_age_days: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage_root: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            file_max_age_days: DEFAULT_FILE_MAX_AGE_DAYS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            storage_root: env::var("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_var("PORT", defaults.port)?,
            max_content_length: parse_var("MAX_CONTENT_LENGTH", defaults.max_content_length)?,
            file_max_age_days: parse_var("FILE_MAX_AGE_DAYS", defaults.file_max_age_days)?,
        })
    }

    /// Config rooted in a scratch directory, used by tests.
    pub fn for_storage_root(root: impl Into<PathBuf>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            storage_root: root.into(),
            ..Self::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upload_limits() {
        let config = AppConfig::default();
        assert_eq!(config.max_content_length, 16 * 1024 * 1024);
        assert_eq!(config.storage_root, PathBuf::from("storage"));
        assert_eq!(config.file_max_age_days, 30);
        assert!(config.database_url.starts_with("sqlite:"));
    }

    #[test]
    fn test_for_storage_root_uses_memory_database() {
        let config = AppConfig::for_storage_root("/tmp/x");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.storage_root, PathBuf::from("/tmp/x"));
        assert_eq!(config.port, 8080);
    }
}
