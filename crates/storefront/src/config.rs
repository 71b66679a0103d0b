//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPFRONT_API_URL` - Base URL of the REST API (default: `http://localhost:8000/api`)
//! - `SHOPFRONT_SESSION_PATH` - Where the token pair is persisted
//!   (default: `<config dir>/shopfront/session.json`)
//! - `SHOPFRONT_CACHE_TTL_SECS` - Lifetime of cached API reads (default: 60)
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `SHOPFRONT_CURRENCY_SYMBOL` - Symbol printed before prices (default: `₹`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every endpoint path is joined onto. Always ends in `/`.
    pub api_url: Url,
    /// Location of the persisted session file.
    pub session_path: PathBuf,
    /// How long cached reads (products, profile, cart) stay fresh.
    pub cache_ttl: Duration,
    /// Optional per-request timeout. `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
    /// Currency symbol used when printing prices.
    pub currency_symbol: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL))?;
        let session_path = get_optional_env("SHOPFRONT_SESSION_PATH")
            .map_or_else(default_session_path, PathBuf::from);
        let cache_ttl = Duration::from_secs(get_parsed_or_default(
            "SHOPFRONT_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);
        let http_timeout = get_optional_env("SHOPFRONT_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_secs("SHOPFRONT_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            api_url,
            session_path,
            cache_ttl,
            http_timeout,
            currency_symbol: get_env_or_default("SHOPFRONT_CURRENCY_SYMBOL", DEFAULT_CURRENCY_SYMBOL),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its
    /// default. Used by tests and embedders that do not read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an http(s) URL.
    pub fn for_api(api_url: &str, session_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            session_path: session_path.into(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            http_timeout: None,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Format a price for display with the configured currency symbol.
    #[must_use]
    pub fn format_price(&self, price: shopfront_core::Price) -> String {
        format!("{}{price}", self.currency_symbol)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, normalising it to end with a slash so that
/// `Url::join("products/")` appends rather than replaces the last segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_session_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(".shopfront").join("session.json"),
        |dir| dir.join("shopfront").join("session.json"),
    )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn get_parsed_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| parse_secs(key, &raw))
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let url = parse_api_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("products/").unwrap().as_str(),
            "http://localhost:8000/api/products/"
        );
    }

    #[test]
    fn test_api_url_keeps_existing_slash() {
        let url = parse_api_url("https://shop.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/");
    }

    #[test]
    fn test_api_url_rejects_other_schemes() {
        let err = parse_api_url("ftp://shop.example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", " 30 ").unwrap(), 30);
        assert!(matches!(
            parse_secs("X", "soon"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_for_api_defaults() {
        let config = StorefrontConfig::for_api("http://127.0.0.1:9000", "/tmp/s.json").unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert!(config.http_timeout.is_none());
        assert_eq!(
            config.format_price(shopfront_core::Price::from_units(13)),
            "₹13"
        );
    }
}
