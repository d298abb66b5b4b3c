//! Session-related types.
//!
//! A session is either anonymous or holds a bearer token. It is restored from
//! the local store at startup and written back on every transition.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use products_plus_core::UserId;

use crate::storage::{LocalStore, StorageError};

/// Identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
}

/// Local store keys.
pub mod keys {
    /// Key for the bearer token.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Key for the logged-in user (`CurrentUser` as JSON).
    pub const CURRENT_USER: &str = "currentUser";

    /// Key for the anonymous cart (array of `CartItem` as JSON).
    pub const CART_ITEMS: &str = "cartItems";
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Anonymous,
    Authenticated {
        token: SecretString,
        user: Option<CurrentUser>,
    },
}

/// The current authentication state.
///
/// `Debug` output never contains the token.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// An anonymous session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated session that is not (yet) persisted.
    #[must_use]
    pub fn authenticated(token: SecretString, user: Option<CurrentUser>) -> Self {
        Self {
            state: SessionState::Authenticated { token, user },
        }
    }

    /// Restore the session from the local store.
    ///
    /// No token means anonymous; a leftover user entry without a token is
    /// removed. An unreadable user entry is ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store itself cannot be read or cleaned.
    pub fn restore<L: LocalStore>(local: &L) -> Result<Self, StorageError> {
        let token = local
            .get(keys::AUTH_TOKEN)?
            .filter(|token| !token.trim().is_empty());

        let Some(token) = token else {
            local.remove(keys::CURRENT_USER)?;
            return Ok(Self::anonymous());
        };

        let user = match local.get_json::<CurrentUser>(keys::CURRENT_USER) {
            Ok(user) => user,
            Err(StorageError::Json(e)) => {
                warn!(error = %e, "Ignoring unreadable stored user");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::authenticated(SecretString::from(token), user))
    }

    /// Move to `Authenticated` and persist the token and user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails. The in-memory session is
    /// authenticated regardless.
    pub fn establish<L: LocalStore>(
        &mut self,
        local: &L,
        token: SecretString,
        user: CurrentUser,
    ) -> Result<(), StorageError> {
        let raw_token = token.expose_secret().to_string();
        self.state = SessionState::Authenticated {
            token,
            user: Some(user.clone()),
        };
        local.set(keys::AUTH_TOKEN, &raw_token)?;
        local.set_json(keys::CURRENT_USER, &user)
    }

    /// Move to `Anonymous` and discard the persisted token and user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleaned. The in-memory
    /// session is anonymous regardless.
    pub fn end<L: LocalStore>(&mut self, local: &L) -> Result<(), StorageError> {
        self.state = SessionState::Anonymous;
        local.remove(keys::AUTH_TOKEN)?;
        local.remove(keys::CURRENT_USER)
    }

    /// The bearer token, if authenticated.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::Authenticated { token, .. } => Some(token),
        }
    }

    /// The logged-in user, if known.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match &self.state {
            SessionState::Authenticated {
                user: Some(user), ..
            } => Some(user),
            _ => None,
        }
    }

    /// Whether a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }
}
