//! Authentication error types.

use thiserror::Error;

use products_plus_core::{CredentialError, EmailError};

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A login or signup field failed validation.
    #[error("{0}")]
    InvalidInput(#[from] CredentialError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong username or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The authentication service failed.
    #[error("auth service error: {0}")]
    Api(#[source] ApiError),

    /// The session could not be persisted or cleared.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
