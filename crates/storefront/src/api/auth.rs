//! Authentication service endpoints.

use std::future::Future;

use secrecy::SecretString;
use tracing::instrument;

use super::{ApiClient, ApiError, LoginRequest, LoginResponse, SignupRequest, SignupResponse};

/// The backend authentication API.
pub trait AuthApi: Send + Sync {
    /// `POST /login`
    fn login(
        &self,
        request: &LoginRequest<'_>,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /signup`
    fn signup(
        &self,
        request: &SignupRequest<'_>,
    ) -> impl Future<Output = Result<SignupResponse, ApiError>> + Send;

    /// `POST /logout` with the session's bearer token.
    fn logout(&self, token: &SecretString) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl AuthApi for ApiClient {
    #[instrument(skip_all, fields(username = %request.username))]
    async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, ApiError> {
        let http = self.http().post(self.endpoint("login")?).json(request);
        self.send_json(http).await
    }

    #[instrument(skip_all, fields(username = %request.username))]
    async fn signup(&self, request: &SignupRequest<'_>) -> Result<SignupResponse, ApiError> {
        let http = self.http().post(self.endpoint("signup")?).json(request);
        let body = self.send(http).await?;
        if body.trim().is_empty() {
            return Ok(SignupResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip_all)]
    async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        let http = Self::authorized(self.http().post(self.endpoint("logout")?), token);
        self.send(http).await?;
        Ok(())
    }
}
