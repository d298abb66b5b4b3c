//! Remote cart store.

use std::future::Future;

use products_plus_core::{CartItem, NewCartItem, ProductId, Quantity};
use secrecy::SecretString;
use tracing::instrument;

use super::{ApiClient, ApiError, QuantityUpdate};

/// The backend cart API. Every call carries the session's bearer token.
pub trait CartStore: Send + Sync {
    /// `GET /cart`
    fn fetch_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    /// `POST /cart`. The store merges quantities for a product already in the
    /// cart and returns the updated list.
    fn add_item(
        &self,
        token: &SecretString,
        item: &NewCartItem,
    ) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    /// `PUT /cart/{productId}`, returns the updated list.
    fn update_quantity(
        &self,
        token: &SecretString,
        product_id: ProductId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    /// `DELETE /cart/{productId}`
    fn remove_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /cart`
    fn clear_cart(&self, token: &SecretString)
    -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartStore for ApiClient {
    #[instrument(skip_all)]
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartItem>, ApiError> {
        let request = Self::authorized(self.http().get(self.endpoint("cart")?), token);
        self.send_json(request).await
    }

    #[instrument(skip_all, fields(product_id = %item.product_id))]
    async fn add_item(
        &self,
        token: &SecretString,
        item: &NewCartItem,
    ) -> Result<Vec<CartItem>, ApiError> {
        let request = Self::authorized(self.http().post(self.endpoint("cart")?), token).json(item);
        self.send_json(request).await
    }

    #[instrument(skip(self, token))]
    async fn update_quantity(
        &self,
        token: &SecretString,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Vec<CartItem>, ApiError> {
        let url = self.endpoint(&format!("cart/{product_id}"))?;
        let request =
            Self::authorized(self.http().put(url), token).json(&QuantityUpdate { quantity });
        self.send_json(request).await
    }

    #[instrument(skip(self, token))]
    async fn remove_item(&self, token: &SecretString, product_id: ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("cart/{product_id}"))?;
        self.send(Self::authorized(self.http().delete(url), token))
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn clear_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        let request = Self::authorized(self.http().delete(self.endpoint("cart")?), token);
        self.send(request).await?;
        Ok(())
    }
}
