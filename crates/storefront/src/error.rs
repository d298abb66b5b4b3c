//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends (the CLI) and the Sentry
//! helpers used by the services: user context, breadcrumbs and capture of
//! server-side failures.

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::cart::{CartError, LOGIN_REQUIRED_MESSAGE};
use crate::services::checkout::CheckoutError;
use crate::services::profile::ProfileError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend or catalog call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP-equivalent status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Api(err) => api_status(err),
            Self::Cart(err) => match err {
                CartError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
                CartError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidInput(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Api(_) => StatusCode::BAD_GATEWAY,
                AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                CheckoutError::EmptyCart
                | CheckoutError::InvalidForm(_)
                | CheckoutError::AmountOutOfRange => StatusCode::BAD_REQUEST,
                CheckoutError::Payment(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::Cart(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Profile(err) => match err {
                ProfileError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                ProfileError::Api(e) => api_status(e),
                ProfileError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether this is a failure on our side or a backend's, as opposed to
    /// a user mistake.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Message safe to show to the user.
    ///
    /// Internal details (URLs, bodies, file paths) are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => "Could not access local data".to_string(),
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => "Not found".to_string(),
            Self::Api(_) => "External service error".to_string(),
            Self::Cart(err) => match err {
                CartError::NotAuthenticated => LOGIN_REQUIRED_MESSAGE.to_string(),
                CartError::InvalidQuantity(e) => e.to_string(),
                CartError::NetworkFailure(_) => {
                    "The cart service is unavailable. Please try again later.".to_string()
                }
                CartError::Storage(_) => "Could not access local data".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidInput(e) => e.to_string(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::InvalidCredentials => "Invalid username or password".to_string(),
                AuthError::UserAlreadyExists => "User already exists".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::NotAuthenticated => "Please log in to check out.".to_string(),
                CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
                CheckoutError::InvalidForm(msg) => msg.clone(),
                CheckoutError::AmountOutOfRange => "Order total is too large".to_string(),
                CheckoutError::Payment(_) => {
                    "Payment could not be started. Please try again later.".to_string()
                }
                CheckoutError::Cart(_) => {
                    "Payment started but the cart could not be cleared".to_string()
                }
            },
            Self::Profile(err) => match err {
                ProfileError::NotAuthenticated => "Please log in to view your profile.".to_string(),
                ProfileError::Api(_) => {
                    "The account service is unavailable. Please try again later.".to_string()
                }
                ProfileError::Storage(_) => {
                    "Account deleted but the local session could not be removed".to_string()
                }
            },
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Capture server-side failures to Sentry and log them.
    pub fn report(&self) {
        if self.is_server_error() {
            report_error(self, "Command failed");
        }
    }
}

fn api_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Capture an error to Sentry and log it with the event ID.
pub fn report_error<E: std::error::Error + ?Sized>(err: &E, context: &str) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        sentry_event_id = %event_id,
        "{context}"
    );
}

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Add to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use products_plus_core::CredentialError;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::from(CartError::NotAuthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ApiError::NotFound("products/99".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CheckoutError::AmountOutOfRange).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ProfileError::NotAuthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert!(
            AppError::from(ProfileError::Api(ApiError::Status {
                status: 503,
                body: String::new(),
            }))
            .is_server_error()
        );
        assert!(
            AppError::from(CartError::NetworkFailure(ApiError::Status {
                status: 500,
                body: String::new(),
            }))
            .is_server_error()
        );
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = AppError::from(ApiError::Status {
            status: 500,
            body: "stack trace at /srv/app.js".to_string(),
        });
        assert_eq!(err.user_message(), "External service error");

        let err = AppError::from(AuthError::from(CredentialError::Length { field: "Username" }));
        assert_eq!(
            err.user_message(),
            "Username must be between 3 and 20 characters long."
        );
    }
}
