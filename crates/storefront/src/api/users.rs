//! User account endpoints.

use std::future::Future;

use products_plus_core::UserId;
use secrecy::SecretString;
use tracing::instrument;

use super::{ApiClient, ApiError, UserProfile};

/// The backend user API.
pub trait UserApi: Send + Sync {
    /// `GET /users/{id}` with the session's bearer token.
    fn fetch_profile(
        &self,
        token: &SecretString,
        id: &UserId,
    ) -> impl Future<Output = Result<UserProfile, ApiError>> + Send;

    /// `DELETE /users/{id}` with the session's bearer token.
    fn delete_account(
        &self,
        token: &SecretString,
        id: &UserId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl UserApi for ApiClient {
    #[instrument(skip(self, token), fields(user_id = %id))]
    async fn fetch_profile(&self, token: &SecretString, id: &UserId) -> Result<UserProfile, ApiError> {
        let http = Self::authorized(self.http().get(self.endpoint(&format!("users/{id}"))?), token);
        self.send_json(http).await
    }

    #[instrument(skip(self, token), fields(user_id = %id))]
    async fn delete_account(&self, token: &SecretString, id: &UserId) -> Result<(), ApiError> {
        let http = Self::authorized(
            self.http().delete(self.endpoint(&format!("users/{id}"))?),
            token,
        );
        self.send(http).await?;
        Ok(())
    }
}
