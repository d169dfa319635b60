//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `COOKIE_SHOP_API_URL` - Backend REST API base URL (default: `http://localhost:8081/api`)
//! - `COOKIE_SHOP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `COOKIE_SHOP_DATA_DIR` - Directory for durable client storage (default: `.cookie-shop`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8081/api";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_DATA_DIR: &str = ".cookie-shop";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend REST API
    pub api_url: Url,
    /// Per-request timeout applied by the HTTP client
    pub timeout: Duration,
    /// Directory holding durable client storage
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("COOKIE_SHOP_API_URL", DEFAULT_API_URL))?;
        let timeout = parse_timeout(&get_env_or_default(
            "COOKIE_SHOP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ))?;
        let data_dir = PathBuf::from(get_env_or_default("COOKIE_SHOP_DATA_DIR", DEFAULT_DATA_DIR));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            timeout,
            data_dir,
            sentry_dsn,
        })
    }

    /// Configuration pointing at the given API URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            timeout: Duration::from_secs(10),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sentry_dsn: None,
        })
    }

    /// Build the absolute URL of an API endpoint.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate the API base URL.
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidEnvVar("COOKIE_SHOP_API_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "COOKIE_SHOP_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a positive timeout in whole seconds.
fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let secs = value.parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("COOKIE_SHOP_TIMEOUT_SECS".to_string(), e.to_string())
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "COOKIE_SHOP_TIMEOUT_SECS".to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_valid() {
        let url = parse_api_url("http://localhost:8081/api").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        let err = parse_api_url("ftp://example.com/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_api_url_rejects_relative() {
        assert!(parse_api_url("/api").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("10").unwrap(), Duration::from_secs(10));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_endpoint_joins_without_dropping_path() {
        let config = ClientConfig::for_api_url("http://localhost:8081/api").unwrap();
        assert_eq!(
            config.endpoint("/favorites"),
            "http://localhost:8081/api/favorites"
        );

        let config = ClientConfig::for_api_url("http://localhost:8081/api/").unwrap();
        assert_eq!(
            config.endpoint("favorites/3"),
            "http://localhost:8081/api/favorites/3"
        );
    }
}
