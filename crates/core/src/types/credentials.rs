//! Login and signup input validation.
//!
//! Login fields accept 3-20 ASCII alphanumeric characters. Signup fields
//! additionally allow `@` and `.` so an email address fits the same rule.

use core::fmt;

use serde::{Serialize, Serializer};

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 20;

/// Errors produced when validating credential input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{field} must be between {min} and {max} characters long.", min = MIN_LENGTH, max = MAX_LENGTH)]
    Length { field: &'static str },
    #[error("{field} can only contain {allowed}.")]
    Characters {
        field: &'static str,
        allowed: &'static str,
    },
}

fn check_length(field: &'static str, value: &str) -> Result<(), CredentialError> {
    let len = value.chars().count();
    if (MIN_LENGTH..=MAX_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(CredentialError::Length { field })
    }
}

fn check_login_chars(field: &'static str, value: &str) -> Result<(), CredentialError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(CredentialError::Characters {
            field,
            allowed: "alphanumeric characters",
        })
    }
}

/// A validated login username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate a username for login.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the length is outside 3-20 or the input
    /// contains anything but ASCII letters and digits.
    pub fn parse(value: &str) -> Result<Self, CredentialError> {
        check_length("Username", value)?;
        check_login_chars("Username", value)?;
        Ok(Self(value.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated login password.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Validate a password for login.
    ///
    /// # Errors
    ///
    /// Same rules as [`Username::parse`].
    pub fn parse(value: &str) -> Result<Self, CredentialError> {
        check_length("Password", value)?;
        check_login_chars("Password", value)?;
        Ok(Self(value.to_owned()))
    }

    /// Returns the raw password for sending to the auth service.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Signup form fields, each validated with the signup character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Email,
    Username,
    Password,
    FirstName,
    LastName,
}

impl SignupField {
    /// Human-readable field label used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Username => "Username",
            Self::Password => "Password",
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
        }
    }

    /// Validate a signup field value.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the length is outside 3-20 or the input
    /// contains anything but ASCII letters, digits, `@` and `.`.
    pub fn validate(self, value: &str) -> Result<(), CredentialError> {
        let field = self.label();
        check_length(field, value)?;
        if value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '@' || c == '.')
        {
            Ok(())
        } else {
            Err(CredentialError::Characters {
                field,
                allowed: "alphanumeric characters, @ and .",
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length() {
        assert!(Username::parse("bob").is_ok());
        assert!(Username::parse(&"a".repeat(20)).is_ok());
        assert_eq!(
            Username::parse("ab"),
            Err(CredentialError::Length { field: "Username" })
        );
        assert!(Username::parse(&"a".repeat(21)).is_err());
    }

    #[test]
    fn test_username_characters() {
        let err = Username::parse("bob smith").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Username can only contain alphanumeric characters."
        );
        assert!(Username::parse("bob@x").is_err());
    }

    #[test]
    fn test_length_message() {
        let err = Password::parse("pw").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be between 3 and 20 characters long."
        );
    }

    #[test]
    fn test_password_debug_redacted() {
        let password = Password::parse("hunter22").unwrap();
        let debug = format!("{password:?}");
        assert!(!debug.contains("hunter22"));
        assert_eq!(password.expose(), "hunter22");
    }

    #[test]
    fn test_signup_allows_email_characters() {
        assert!(SignupField::Email.validate("jo@mail.com").is_ok());
        assert!(SignupField::Username.validate("jo.smith").is_ok());
        let err = SignupField::FirstName.validate("Jo-Ann").unwrap_err();
        assert_eq!(
            err.to_string(),
            "First Name can only contain alphanumeric characters, @ and ."
        );
    }
}
