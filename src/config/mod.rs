//! Configuration module for the portal backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable text
    pub log_json: bool,
    /// Session token granted to the built-in admin user on startup
    pub bootstrap_admin_token: Option<String>,
    /// Page size used when a listing request does not name one
    pub default_page_size: u32,
    /// Upper bound for any requested page size
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/portal.sqlite"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            log_json: false,
            bootstrap_admin_token: None,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let db_path = env::var("PORTAL_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let bind_addr = match env::var("PORTAL_BIND_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid PORTAL_BIND_ADDR {}: {}", raw, e)))?,
            Err(_) => defaults.bind_addr,
        };

        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_json = match env::var("PORTAL_LOG_FORMAT") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "json" => true,
                "text" | "" => false,
                _ => return Err(AppError::Internal(format!("Invalid PORTAL_LOG_FORMAT: {}", raw))),
            },
            Err(_) => defaults.log_json,
        };

        let bootstrap_admin_token = env::var("PORTAL_BOOTSTRAP_ADMIN_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let default_page_size = parse_page_size("PORTAL_DEFAULT_PAGE_SIZE", defaults.default_page_size)?;
        let max_page_size = parse_page_size("PORTAL_MAX_PAGE_SIZE", defaults.max_page_size)?;

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            bootstrap_admin_token,
            default_page_size: default_page_size.min(max_page_size),
            max_page_size,
        })
    }
}

fn parse_page_size(var: &str, default: u32) -> Result<u32, AppError> {
    match env::var(var) {
        Ok(raw) => match raw.parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(AppError::Internal(format!("Invalid {}: {}", var, raw))),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("PORTAL_DB_PATH");
        env::remove_var("PORTAL_BIND_ADDR");
        env::remove_var("PORTAL_LOG_LEVEL");
        env::remove_var("PORTAL_LOG_FORMAT");
        env::remove_var("PORTAL_BOOTSTRAP_ADMIN_TOKEN");
        env::remove_var("PORTAL_DEFAULT_PAGE_SIZE");
        env::remove_var("PORTAL_MAX_PAGE_SIZE");

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/portal.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.bootstrap_admin_token.is_none());
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }
}
