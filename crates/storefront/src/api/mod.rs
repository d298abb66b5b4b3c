//! REST clients for the Products Plus backends.
//!
//! # Architecture
//!
//! - [`ApiClient`] talks to the cart/auth/payments backend with `reqwest`
//! - [`CatalogClient`] reads the product catalog and caches responses in
//!   memory via `moka`
//! - The backend is the source of truth for carts once a user is
//!   authenticated; nothing here caches cart data
//!
//! # Seams
//!
//! The cart manager and services depend on the [`CartStore`], [`AuthApi`],
//! [`UserApi`] and [`PaymentGateway`] traits rather than on `ApiClient`
//! directly, so tests can substitute in-memory fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! use products_plus_storefront::api::{ApiClient, CartStore};
//!
//! let client = ApiClient::new(config.api_url.clone());
//! let items = client.fetch_cart(&token).await?;
//! ```

mod auth;
mod cache;
mod cart;
mod catalog;
mod payments;
pub mod types;
mod users;

pub use auth::AuthApi;
pub use cart::CartStore;
pub use catalog::CatalogClient;
pub use payments::PaymentGateway;
pub use types::*;
pub use users::UserApi;

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Maximum number of body characters kept in errors and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Errors that can occur when calling a backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was missing, expired or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this error means the session is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Client for the cart, auth and payments backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        }
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a relative endpoint path such as `cart/3`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Attach a bearer token to a request.
    pub(crate) fn authorized(request: RequestBuilder, token: &SecretString) -> RequestBuilder {
        request.bearer_auth(token.expose_secret())
    }

    /// Send a request and return the body of a successful response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url_path = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let preview = body.chars().take(BODY_PREVIEW_CHARS).collect::<String>();
        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::debug!(status = %status, path = %url_path, "Backend rejected credentials");
                Err(ApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(url_path)),
            _ => {
                tracing::error!(
                    status = %status,
                    path = %url_path,
                    body = %preview,
                    "Backend returned non-success status"
                );
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body: preview,
                })
            }
        }
    }

    /// Send a request and decode a JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}
