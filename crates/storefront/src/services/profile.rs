//! Account profile: show the logged-in user's record or delete the account.
//!
//! Both operations act on the session held by a [`CartSessionManager`]. A
//! rejected token ends that session; a deleted account ends it as well.

use products_plus_core::UserId;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, UserApi, UserProfile};
use crate::error::{add_breadcrumb, report_error};
use crate::services::cart::CartSessionManager;
use crate::storage::{LocalStore, StorageError};

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("user API error: {0}")]
    Api(#[source] ApiError),

    /// The account was deleted but the local session could not be removed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Reads and deletes the account behind the current session.
pub struct ProfileService<'a, U> {
    users: &'a U,
}

impl<'a, U: UserApi> ProfileService<'a, U> {
    #[must_use]
    pub const fn new(users: &'a U) -> Self {
        Self { users }
    }

    /// Fetch the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session (or after the backend
    /// rejects its token) and `Api` if the request fails.
    #[instrument(skip_all)]
    pub async fn fetch<B, L: LocalStore>(
        &self,
        manager: &mut CartSessionManager<B, L>,
    ) -> Result<UserProfile, ProfileError> {
        let (token, id) = identity(manager)?;

        match self.users.fetch_profile(&token, &id).await {
            Ok(profile) => Ok(profile),
            Err(e) => Err(failure(manager, e, "Failed to fetch user profile")),
        }
    }

    /// Delete the logged-in user's account, then end the session.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, `Api` if the backend
    /// refuses (the session is kept), or `Storage` if the deleted account's
    /// session cannot be removed from the local store.
    #[instrument(skip_all)]
    pub async fn delete_account<B, L: LocalStore>(
        &self,
        manager: &mut CartSessionManager<B, L>,
    ) -> Result<(), ProfileError> {
        let (token, id) = identity(manager)?;
        add_breadcrumb("account", "Delete account", None);

        if let Err(e) = self.users.delete_account(&token, &id).await {
            return Err(failure(manager, e, "Failed to delete user account"));
        }

        manager.end_session()?;
        info!(user_id = %id, "Account deleted");
        Ok(())
    }
}

fn identity<B, L: LocalStore>(
    manager: &CartSessionManager<B, L>,
) -> Result<(SecretString, UserId), ProfileError> {
    let session = manager.session();
    match (session.token(), session.user()) {
        (Some(token), Some(user)) => Ok((token.clone(), user.id.clone())),
        (Some(_), None) => {
            warn!("Session has a token but no stored user");
            Err(ProfileError::NotAuthenticated)
        }
        _ => Err(ProfileError::NotAuthenticated),
    }
}

fn failure<B, L: LocalStore>(
    manager: &mut CartSessionManager<B, L>,
    err: ApiError,
    context: &str,
) -> ProfileError {
    if err.is_unauthorized() {
        manager.expire_session();
        return ProfileError::NotAuthenticated;
    }
    report_error(&err, context);
    ProfileError::Api(err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{CurrentUser, keys};
    use crate::services::cart::SESSION_EXPIRED_MESSAGE;
    use crate::storage::MemoryStore;
    use crate::testing::{BackendCall, FakeBackend, cart_item};

    const STORED_USER: &str = r#"{"id":"1","username":"alice"}"#;

    fn logged_in(backend: &FakeBackend) -> CartSessionManager<FakeBackend, MemoryStore> {
        let local = MemoryStore::with_entries([
            (keys::AUTH_TOKEN, "token-alice"),
            (keys::CURRENT_USER, STORED_USER),
        ]);
        CartSessionManager::restore(backend.clone(), local).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_profile_for_session_user() {
        let backend = FakeBackend::default();
        let mut manager = logged_in(&backend);

        let profile = ProfileService::new(&backend)
            .fetch(&mut manager)
            .await
            .unwrap();

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@mail.com");
        assert_eq!(backend.calls(), vec![BackendCall::FetchProfile(UserId::new("1"))]);
        assert_eq!(backend.last_token().as_deref(), Some("token-alice"));
    }

    #[tokio::test]
    async fn test_anonymous_profile_is_rejected_without_network() {
        let backend = FakeBackend::default();
        let mut manager = CartSessionManager::restore(backend.clone(), MemoryStore::new()).unwrap();
        let profiles = ProfileService::new(&backend);

        assert!(matches!(
            profiles.fetch(&mut manager).await,
            Err(ProfileError::NotAuthenticated)
        ));
        assert!(matches!(
            profiles.delete_account(&mut manager).await,
            Err(ProfileError::NotAuthenticated)
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_token_ends_session() {
        let backend = FakeBackend::default();
        let mut manager = logged_in(&backend);

        backend.fail_next_with_status(401);
        let err = ProfileService::new(&backend)
            .fetch(&mut manager)
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileError::NotAuthenticated));
        assert!(!manager.session().is_authenticated());
        assert_eq!(manager.message(), Some(SESSION_EXPIRED_MESSAGE));
    }

    #[tokio::test]
    async fn test_delete_account_ends_session() {
        let backend = FakeBackend::with_cart(vec![cart_item(1, 10, 2)]);
        let mut manager = logged_in(&backend);
        manager.load().await.unwrap();

        ProfileService::new(&backend)
            .delete_account(&mut manager)
            .await
            .unwrap();

        assert!(!manager.session().is_authenticated());
        assert!(manager.cart().is_empty());
        assert_eq!(manager.local().get(keys::AUTH_TOKEN).unwrap(), None);
        assert_eq!(manager.local().get(keys::CURRENT_USER).unwrap(), None);
        assert_eq!(
            backend.calls().last(),
            Some(&BackendCall::DeleteAccount(UserId::new("1")))
        );
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_session() {
        let backend = FakeBackend::default();
        let mut manager = logged_in(&backend);

        backend.fail_next_with_status(500);
        let err = ProfileService::new(&backend)
            .delete_account(&mut manager)
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileError::Api(_)));
        assert!(manager.session().is_authenticated());
        assert_eq!(
            manager.session().user(),
            Some(&CurrentUser {
                id: UserId::new("1"),
                username: "alice".to_string(),
            })
        );
    }
}
