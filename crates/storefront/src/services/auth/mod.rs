//! Authentication service.
//!
//! Validates login and signup input before anything reaches the network and
//! maps backend responses onto [`AuthError`]. Login and logout themselves
//! live on the cart session manager, which owns the session they change.

mod error;

pub use error::AuthError;

use products_plus_core::{Email, Password, SignupField, Username};
use tracing::{info, instrument};

use crate::api::{ApiError, AuthApi, SignupRequest, SignupResponse};

/// Validate login input.
///
/// # Errors
///
/// Returns `AuthError::InvalidInput` if either field is not 3-20 ASCII
/// alphanumeric characters.
pub fn validate_login(username: &str, password: &str) -> Result<(Username, Password), AuthError> {
    Ok((Username::parse(username)?, Password::parse(password)?))
}

/// Signup form input.
#[derive(Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

impl SignupForm {
    fn fields(&self) -> [(SignupField, &str); 5] {
        [
            (SignupField::Email, &self.email),
            (SignupField::Username, &self.username),
            (SignupField::Password, &self.password),
            (SignupField::FirstName, &self.first_name),
            (SignupField::LastName, &self.last_name),
        ]
    }

    /// Validate every field, stopping at the first failure in form order.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for a field outside the allowed
    /// length or characters, or `AuthError::InvalidEmail` if the email does
    /// not parse.
    pub fn validate(&self) -> Result<Email, AuthError> {
        for (field, value) in self.fields() {
            field.validate(value)?;
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Account registration against the authentication service.
pub struct AuthService<'a, A> {
    api: &'a A,
}

impl<'a, A: AuthApi> AuthService<'a, A> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call, or
    /// `AuthError::UserAlreadyExists` if the backend answers 400.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResponse, AuthError> {
        let email = form.validate()?;

        let response = self
            .api
            .signup(&SignupRequest {
                email: email.as_str(),
                username: &form.username,
                password: &form.password,
                firstname: &form.first_name,
                lastname: &form.last_name,
            })
            .await
            .map_err(|e| match e {
                ApiError::Status { status: 400, .. } => AuthError::UserAlreadyExists,
                other => AuthError::Api(other),
            })?;

        info!("Account created");
        Ok(response)
    }
}
