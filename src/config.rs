//! Configuration Module
//!
//! Handles loading and managing data-layer configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Data layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote document API
    pub endpoint: String,
    /// Project identifier sent with every API request
    pub project_id: String,
    /// API key sent with every API request
    pub api_key: String,
    /// Database the dashboard collections live under
    pub database_id: String,
    /// Path of the durable cache file
    pub cache_path: PathBuf,
    /// Whether cache entries are mirrored to disk
    pub persist: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CALLDECK_ENDPOINT` - Document API base URL (default: https://cloud.appwrite.io/v1)
    /// - `CALLDECK_PROJECT_ID` - Project identifier (default: empty)
    /// - `CALLDECK_API_KEY` - API key (default: empty)
    /// - `CALLDECK_DATABASE_ID` - Database identifier (default: ColdCalls)
    /// - `CALLDECK_CACHE_PATH` - Durable cache file path (default: calldeck_cache.json)
    /// - `CALLDECK_PERSIST` - Mirror cache entries to disk (default: true)
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("CALLDECK_ENDPOINT")
                .unwrap_or_else(|_| "https://cloud.appwrite.io/v1".to_string()),
            project_id: env::var("CALLDECK_PROJECT_ID").unwrap_or_default(),
            api_key: env::var("CALLDECK_API_KEY").unwrap_or_default(),
            database_id: env::var("CALLDECK_DATABASE_ID")
                .unwrap_or_else(|_| "ColdCalls".to_string()),
            cache_path: env::var("CALLDECK_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("calldeck_cache.json")),
            persist: env::var("CALLDECK_PERSIST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            api_key: String::new(),
            database_id: "ColdCalls".to_string(),
            cache_path: PathBuf::from("calldeck_cache.json"),
            persist: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.endpoint, "https://cloud.appwrite.io/v1");
        assert_eq!(config.database_id, "ColdCalls");
        assert_eq!(config.cache_path, PathBuf::from("calldeck_cache.json"));
        assert!(config.persist);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CALLDECK_ENDPOINT");
        env::remove_var("CALLDECK_PROJECT_ID");
        env::remove_var("CALLDECK_API_KEY");
        env::remove_var("CALLDECK_DATABASE_ID");
        env::remove_var("CALLDECK_CACHE_PATH");
        env::remove_var("CALLDECK_PERSIST");

        let config = Config::from_env();
        assert_eq!(config.endpoint, "https://cloud.appwrite.io/v1");
        assert!(config.project_id.is_empty());
        assert!(config.api_key.is_empty());
        assert_eq!(config.database_id, "ColdCalls");
        assert!(config.persist);
    }
}
