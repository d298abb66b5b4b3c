//! Checkout: turn the current cart into a payment intent.
//!
//! The payment itself is collected by the provider-hosted form using the
//! returned client secret. Once the intent exists the cart is cleared.

use products_plus_core::{CurrencyCode, Email, EmailError, Price};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiError, CartStore, PaymentGateway, PaymentIntentRequest};
use crate::error::{add_breadcrumb, report_error};
use crate::models::CartState;
use crate::services::cart::{CartError, CartSessionManager};
use crate::storage::LocalStore;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("cart is empty")]
    EmptyCart,

    /// A form field is missing or malformed. Holds the user-facing message.
    #[error("{0}")]
    InvalidForm(String),

    /// The order total overflows or cannot be expressed in minor currency
    /// units.
    #[error("order total out of range")]
    AmountOutOfRange,

    #[error("payment error: {0}")]
    Payment(#[source] ApiError),

    #[error("cart error: {0}")]
    Cart(#[from] CartError),
}

impl From<EmailError> for CheckoutError {
    fn from(err: EmailError) -> Self {
        Self::InvalidForm(format!("Email is invalid: {err}."))
    }
}

/// Shipping and contact details collected at checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
}

impl CheckoutForm {
    /// Check that every field is filled in and the email parses.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidForm` naming the first bad field.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        for (label, value) in [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::InvalidForm(format!("{label} is required.")));
            }
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Totals shown before payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub item_count: u64,
    pub subtotal: Price,
}

impl OrderSummary {
    /// Summarize `cart`. `None` if its subtotal overflows.
    #[must_use]
    pub fn from_cart(cart: &CartState, currency: CurrencyCode) -> Option<Self> {
        Some(Self {
            item_count: cart.item_count(),
            subtotal: Price::new(cart.subtotal()?, currency),
        })
    }
}

/// Result of a successful checkout.
#[derive(Debug)]
pub struct CheckoutReceipt {
    pub summary: OrderSummary,
    pub email: Email,
    pub name: String,
    /// Secret for the provider-hosted payment form.
    pub client_secret: SecretString,
}

/// Places orders for the cart held by a [`CartSessionManager`].
pub struct CheckoutService<'a, P> {
    payments: &'a P,
    currency: CurrencyCode,
}

impl<'a, P: PaymentGateway> CheckoutService<'a, P> {
    #[must_use]
    pub const fn new(payments: &'a P, currency: CurrencyCode) -> Self {
        Self { payments, currency }
    }

    /// Summarize the manager's current cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::AmountOutOfRange` if the subtotal overflows.
    pub fn summary(&self, cart: &CartState) -> Result<OrderSummary, CheckoutError> {
        OrderSummary::from_cart(cart, self.currency).ok_or(CheckoutError::AmountOutOfRange)
    }

    /// Create a payment intent for the current cart, then clear the cart.
    ///
    /// Uses the cart as last loaded; callers load it first.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` or `EmptyCart` before touching the network,
    /// `InvalidForm` for bad input, `AmountOutOfRange` if the total cannot be
    /// charged, `Payment` if the intent cannot be
    /// created, or `Cart` if clearing the cart fails afterwards.
    #[instrument(skip_all)]
    pub async fn place_order<B: CartStore, L: LocalStore>(
        &self,
        manager: &mut CartSessionManager<B, L>,
        form: &CheckoutForm,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let Some(token) = manager.session().token().cloned() else {
            return Err(CheckoutError::NotAuthenticated);
        };
        if manager.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let email = form.validate()?;

        let summary = self.summary(manager.cart())?;
        let amount = summary
            .subtotal
            .minor_units()
            .ok_or(CheckoutError::AmountOutOfRange)?;
        add_breadcrumb("checkout", "Create payment intent", None);

        let request = PaymentIntentRequest {
            amount,
            currency: self.currency.code().to_ascii_lowercase(),
        };
        let intent = match self.payments.create_payment_intent(&token, &request).await {
            Ok(intent) => intent,
            Err(ApiError::Unauthorized) => {
                manager.expire_session();
                return Err(CheckoutError::NotAuthenticated);
            }
            Err(e) => {
                report_error(&e, "Failed to create payment intent");
                return Err(CheckoutError::Payment(e));
            }
        };

        manager.clear().await?;
        info!(amount, items = summary.item_count, "Order placed");

        Ok(CheckoutReceipt {
            summary,
            email,
            name: form.name.trim().to_string(),
            client_secret: SecretString::from(intent.client_secret),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use products_plus_core::{CartItem, ProductId, Quantity};
    use rust_decimal::Decimal;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::models::keys;
    use crate::storage::MemoryStore;
    use crate::testing::{BackendCall, FakeBackend, cart_item, product};

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Alice Doe".to_string(),
            email: "alice@mail.com".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    async fn loaded_manager(backend: &FakeBackend) -> CartSessionManager<FakeBackend, MemoryStore> {
        let local = MemoryStore::with_entries([(keys::AUTH_TOKEN, "token-alice")]);
        let mut manager = CartSessionManager::restore(backend.clone(), local).unwrap();
        manager.load().await.unwrap();
        manager
    }

    #[test]
    fn test_form_requires_every_field() {
        let mut missing = form();
        missing.address = "  ".to_string();
        assert_eq!(
            missing.validate().unwrap_err().to_string(),
            "Address is required."
        );

        let mut bad_email = form();
        bad_email.email = "alice".to_string();
        assert!(matches!(
            bad_email.validate(),
            Err(CheckoutError::InvalidForm(_))
        ));
    }

    #[tokio::test]
    async fn test_place_order_creates_intent_and_clears_cart() {
        let backend = FakeBackend::with_cart(vec![cart_item(1, 10, 2), cart_item(2, 20, 1)]);
        let mut manager = loaded_manager(&backend).await;
        let checkout = CheckoutService::new(&backend, CurrencyCode::USD);

        let receipt = checkout.place_order(&mut manager, &form()).await.unwrap();

        assert_eq!(receipt.summary.item_count, 3);
        assert_eq!(receipt.summary.subtotal.to_string(), "$40.00");
        assert_eq!(receipt.client_secret.expose_secret(), "pi_4000_secret");
        assert!(manager.cart().is_empty());
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::Fetch,
                BackendCall::PaymentIntent(4000, "usd".to_string()),
                BackendCall::Clear,
            ]
        );
    }

    #[tokio::test]
    async fn test_fractional_prices_round_to_cents() {
        let backend = FakeBackend::default();
        let mut manager = loaded_manager(&backend).await;
        let mut item = product(5, 0);
        item.price = Decimal::new(10995, 2);
        manager.add_item(&item, Quantity::clamped(3)).await.unwrap();

        let receipt = CheckoutService::new(&backend, CurrencyCode::EUR)
            .place_order(&mut manager, &form())
            .await
            .unwrap();

        assert_eq!(receipt.summary.subtotal.to_string(), "€329.85");
        assert!(backend.calls().contains(&BackendCall::PaymentIntent(32985, "eur".to_string())));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let backend = FakeBackend::default();
        let mut manager = loaded_manager(&backend).await;

        let err = CheckoutService::new(&backend, CurrencyCode::USD)
            .place_order(&mut manager, &form())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_anonymous_checkout_is_rejected() {
        let backend = FakeBackend::default();
        let mut manager = CartSessionManager::restore(backend.clone(), MemoryStore::new()).unwrap();

        let err = CheckoutService::new(&backend, CurrencyCode::USD)
            .place_order(&mut manager, &form())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_payment_failure_keeps_cart() {
        let backend = FakeBackend::with_cart(vec![cart_item(1, 10, 1)]);
        let mut manager = loaded_manager(&backend).await;

        backend.fail_next_with_status(500);
        let err = CheckoutService::new(&backend, CurrencyCode::USD)
            .place_order(&mut manager, &form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Payment(_)));
        assert_eq!(manager.item_count(), 1);
        assert_eq!(backend.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_total_is_rejected_before_payment() {
        let huge = CartItem {
            product_id: ProductId::new(1),
            title: "Gold bar".to_string(),
            price: Decimal::MAX,
            quantity: Quantity::clamped(2),
            image: String::new(),
        };
        let backend = FakeBackend::with_cart(vec![huge]);
        let mut manager = loaded_manager(&backend).await;

        let err = CheckoutService::new(&backend, CurrencyCode::USD)
            .place_order(&mut manager, &form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::AmountOutOfRange));
        assert_eq!(manager.item_count(), 2);
        assert_eq!(backend.calls(), vec![BackendCall::Fetch]);
    }

    #[tokio::test]
    async fn test_total_without_minor_units_is_rejected() {
        let mut line = cart_item(1, 1, 1);
        line.price = Decimal::MAX;
        let backend = FakeBackend::with_cart(vec![line]);
        let mut manager = loaded_manager(&backend).await;
        let checkout = CheckoutService::new(&backend, CurrencyCode::USD);

        assert!(checkout.summary(manager.cart()).is_ok());
        let err = checkout.place_order(&mut manager, &form()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::AmountOutOfRange));
        assert_eq!(backend.calls(), vec![BackendCall::Fetch]);
    }
}
