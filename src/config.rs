//! Configuration management for PDF Highlighter

use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::highlights::DEFAULT_COLOR;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted PDF, in bytes
    pub max_bytes: usize,
}

/// Client-side settings for the overlay engine
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Backend base URL
    pub api_url: String,
    /// Identity sent with saved highlights and history
    pub user_id: String,
    pub default_color: String,
    pub warmup_initial_ms: u64,
    pub warmup_cap_ms: u64,
    pub warmup_attempts: u32,
}

impl ViewerConfig {
    pub fn warmup_initial(&self) -> Duration {
        Duration::from_millis(self.warmup_initial_ms)
    }

    pub fn warmup_cap(&self) -> Duration {
        Duration::from_millis(self.warmup_cap_ms)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            api_url: "http://localhost:8000".to_string(),
            user_id: "default-user".to_string(),
            default_color: DEFAULT_COLOR.to_string(),
            warmup_initial_ms: 100,
            warmup_cap_ms: 5000,
            warmup_attempts: 8,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite:./highlighter.db".to_string(),
            },
            upload: UploadConfig {
                max_bytes: 50 * 1024 * 1024,
            },
            viewer: ViewerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let viewer = defaults.viewer;

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            upload: UploadConfig {
                max_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.upload.max_bytes)?,
            },
            viewer: ViewerConfig {
                api_url: env::var("HIGHLIGHTER_API_URL").unwrap_or(viewer.api_url),
                user_id: env::var("HIGHLIGHTER_USER_ID").unwrap_or(viewer.user_id),
                default_color: env::var("HIGHLIGHTER_COLOR").unwrap_or(viewer.default_color),
                warmup_initial_ms: parse_var("HIGHLIGHTER_WARMUP_INITIAL_MS", viewer.warmup_initial_ms)?,
                warmup_cap_ms: parse_var("HIGHLIGHTER_WARMUP_CAP_MS", viewer.warmup_cap_ms)?,
                warmup_attempts: parse_var("HIGHLIGHTER_WARMUP_ATTEMPTS", viewer.warmup_attempts)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.viewer.user_id, "default-user");
        assert_eq!(config.viewer.warmup_initial(), Duration::from_millis(100));
        assert_eq!(config.viewer.warmup_cap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("PDF_HIGHLIGHTER_TEST_PORT", "eighty");
        let result: Result<u16, _> = parse_var("PDF_HIGHLIGHTER_TEST_PORT", 1);
        assert!(result.is_err());
        env::remove_var("PDF_HIGHLIGHTER_TEST_PORT");

        let result: Result<u16, _> = parse_var("PDF_HIGHLIGHTER_TEST_PORT", 1);
        assert_eq!(result.unwrap(), 1);
    }
}
