//! Payment intent endpoint.

use std::future::Future;

use secrecy::SecretString;
use tracing::instrument;

use super::{ApiClient, ApiError, PaymentIntent, PaymentIntentRequest};

/// Creates payment intents for the provider-hosted payment form.
pub trait PaymentGateway: Send + Sync {
    /// `POST /create-payment-intent`
    fn create_payment_intent(
        &self,
        token: &SecretString,
        request: &PaymentIntentRequest,
    ) -> impl Future<Output = Result<PaymentIntent, ApiError>> + Send;
}

impl PaymentGateway for ApiClient {
    #[instrument(skip(self, token), fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(
        &self,
        token: &SecretString,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError> {
        let url = self.endpoint("create-payment-intent")?;
        let http = Self::authorized(self.http().post(url), token).json(request);
        self.send_json(http).await
    }
}
