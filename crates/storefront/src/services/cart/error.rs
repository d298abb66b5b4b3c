//! Cart session error types.

use products_plus_core::QuantityError;
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during cart operations.
///
/// None of these are fatal: the manager keeps its last good cart and records
/// a user-visible message alongside the error.
#[derive(Debug, Error)]
pub enum CartError {
    /// The operation needs a logged-in session. Callers redirect to login.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The remote store could not be reached or rejected the request.
    #[error("network failure: {0}")]
    NetworkFailure(#[source] ApiError),

    /// A quantity out of range was requested. `update_quantity` clamps it
    /// and reports a notice instead of returning this.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The local store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for CartError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::NotAuthenticated
        } else {
            Self::NetworkFailure(err)
        }
    }
}

/// Cart operations, used to pick log fields and user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Load,
    Add,
    Update,
    Remove,
    Clear,
}

impl CartOperation {
    /// Short name for logs and breadcrumbs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Clear => "clear",
        }
    }

    /// Message shown when the operation fails on the network.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Error fetching cart items. Please try again later.",
            Self::Add => "Error adding item to cart. Please try again later.",
            Self::Update => "Error updating item quantity. Please try again later.",
            Self::Remove => "Error removing item from cart. Please try again later.",
            Self::Clear => "Error clearing cart. Please try again later.",
        }
    }
}

/// Message shown when a mutation is attempted without a session.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to manage your cart.";

/// Message shown when the backend rejects the session token.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
