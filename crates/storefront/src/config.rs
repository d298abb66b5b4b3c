//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `PRODUCTS_PLUS_API_URL` - Cart, auth and payments backend (default: <http://localhost:3001>)
//! - `PRODUCTS_PLUS_CATALOG_URL` - Product catalog service (default: <https://fakestoreapi.com>)
//! - `PRODUCTS_PLUS_DATA_DIR` - Directory for the local key/value store (default: `.products-plus`)
//! - `PRODUCTS_PLUS_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `PRODUCTS_PLUS_CURRENCY` - ISO 4217 code used for checkout (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use products_plus_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
const DEFAULT_DATA_DIR: &str = ".products-plus";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the cart/auth/payments backend
    pub api_url: Url,
    /// Base URL of the product catalog service
    pub catalog_url: Url,
    /// Directory holding the persisted local store
    pub data_dir: PathBuf,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Currency for order totals and payment intents
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_url = parse_base_url(
            "PRODUCTS_PLUS_API_URL",
            &env_or("PRODUCTS_PLUS_API_URL", DEFAULT_API_URL),
        )?;
        let catalog_url = parse_base_url(
            "PRODUCTS_PLUS_CATALOG_URL",
            &env_or("PRODUCTS_PLUS_CATALOG_URL", DEFAULT_CATALOG_URL),
        )?;
        let data_dir = PathBuf::from(env_or("PRODUCTS_PLUS_DATA_DIR", DEFAULT_DATA_DIR));
        let ttl_secs = env_or("PRODUCTS_PLUS_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "PRODUCTS_PLUS_CATALOG_CACHE_TTL_SECS".to_string(),
                    e.to_string(),
                )
            })?;
        let currency = env_or("PRODUCTS_PLUS_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("PRODUCTS_PLUS_CURRENCY".to_string(), e))?;

        Ok(Self {
            api_url,
            catalog_url,
            data_dir,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            currency,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Configuration pointing both services at one base URL.
    ///
    /// Used by tests and local setups where a single mock server answers
    /// every endpoint.
    #[must_use]
    pub fn for_base_url(base: Url, data_dir: PathBuf) -> Self {
        Self {
            api_url: base.clone(),
            catalog_url: base,
            data_dir,
            catalog_cache_ttl: Duration::from_secs(300),
            currency: CurrencyCode::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, requiring http(s) and normalizing a trailing slash so
/// that `Url::join` keeps any path prefix.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:3001/");
        assert_eq!(config.catalog_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.data_dir, PathBuf::from(".products-plus"));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = config_from(&[(
            "PRODUCTS_PLUS_API_URL",
            "https://users-server.example.com/api",
        )])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://users-server.example.com/api/");
        assert_eq!(
            config.api_url.join("cart").unwrap().as_str(),
            "https://users-server.example.com/api/cart"
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = config_from(&[("PRODUCTS_PLUS_CATALOG_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PRODUCTS_PLUS_CATALOG_URL"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = config_from(&[("PRODUCTS_PLUS_API_URL", "ftp://example.com")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_invalid_ttl_and_currency() {
        assert!(config_from(&[("PRODUCTS_PLUS_CATALOG_CACHE_TTL_SECS", "soon")]).is_err());
        assert!(config_from(&[("PRODUCTS_PLUS_CURRENCY", "DOGE")]).is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_none() {
        let config = config_from(&[("SENTRY_DSN", ""), ("SENTRY_ENVIRONMENT", "staging")]).unwrap();
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.sentry_environment.as_deref(), Some("staging"));
    }
}
