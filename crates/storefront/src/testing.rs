//! In-memory backend used by unit tests.

use std::sync::{Arc, Mutex, PoisonError};

use products_plus_core::{CartItem, NewCartItem, ProductId, Quantity, UserId};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::api::{
    ApiError, AuthApi, CartStore, LoginRequest, LoginResponse, PaymentGateway, PaymentIntent,
    PaymentIntentRequest, Product, SignupRequest, SignupResponse, UserApi, UserProfile,
};
use crate::models::CurrentUser;

/// Password accepted by [`FakeBackend::login`].
pub const VALID_PASSWORD: &str = "secret123";

/// Username that [`FakeBackend::signup`] reports as taken.
pub const TAKEN_USERNAME: &str = "taken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Fetch,
    Add(ProductId),
    Update(ProductId, u32),
    Remove(ProductId),
    Clear,
    Login,
    Signup,
    Logout,
    FetchProfile(UserId),
    DeleteAccount(UserId),
    PaymentIntent(i64, String),
}

#[derive(Debug, Default)]
struct FakeState {
    cart: Vec<CartItem>,
    calls: Vec<BackendCall>,
    fail_next: Option<u16>,
    last_token: Option<String>,
}

/// Backend double that keeps one cart and records every call.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// manager.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn with_cart(cart: Vec<CartItem>) -> Self {
        let backend = Self::default();
        backend.with_state(|state| state.cart = cart);
        backend
    }

    /// Make the next call fail with `status`. 401 maps to `Unauthorized`.
    pub fn fail_next_with_status(&self, status: u16) {
        self.with_state(|state| state.fail_next = Some(status));
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.with_state(|state| state.calls.clone())
    }

    pub fn cart(&self) -> Vec<CartItem> {
        self.with_state(|state| state.cart.clone())
    }

    pub fn last_token(&self) -> Option<String> {
        self.with_state(|state| state.last_token.clone())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Record a call and consume any pending failure.
    fn record(&self, call: BackendCall, token: Option<&SecretString>) -> Result<(), ApiError> {
        self.with_state(|state| {
            state.calls.push(call);
            if let Some(token) = token {
                state.last_token = Some(token.expose_secret().to_string());
            }
            match state.fail_next.take() {
                None => Ok(()),
                Some(401) => Err(ApiError::Unauthorized),
                Some(status) => Err(ApiError::Status {
                    status,
                    body: "fake failure".to_string(),
                }),
            }
        })
    }
}

impl CartStore for FakeBackend {
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartItem>, ApiError> {
        self.record(BackendCall::Fetch, Some(token))?;
        Ok(self.cart())
    }

    async fn add_item(
        &self,
        token: &SecretString,
        item: &NewCartItem,
    ) -> Result<Vec<CartItem>, ApiError> {
        self.record(BackendCall::Add(item.product_id), Some(token))?;
        let quantity = item.quantity.unwrap_or_default();
        Ok(self.with_state(|state| {
            match state.cart.iter_mut().find(|i| i.product_id == item.product_id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
                None => state.cart.push(CartItem {
                    product_id: item.product_id,
                    title: item.title.clone(),
                    price: item.price,
                    quantity,
                    image: item.image.clone(),
                }),
            }
            state.cart.clone()
        }))
    }

    async fn update_quantity(
        &self,
        token: &SecretString,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Vec<CartItem>, ApiError> {
        self.record(BackendCall::Update(product_id, quantity.get()), Some(token))?;
        Ok(self.with_state(|state| {
            if let Some(existing) = state.cart.iter_mut().find(|i| i.product_id == product_id) {
                existing.quantity = quantity;
            }
            state.cart.clone()
        }))
    }

    async fn remove_item(&self, token: &SecretString, product_id: ProductId) -> Result<(), ApiError> {
        self.record(BackendCall::Remove(product_id), Some(token))?;
        self.with_state(|state| state.cart.retain(|i| i.product_id != product_id));
        Ok(())
    }

    async fn clear_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        self.record(BackendCall::Clear, Some(token))?;
        self.with_state(|state| state.cart.clear());
        Ok(())
    }
}

impl AuthApi for FakeBackend {
    async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, ApiError> {
        self.record(BackendCall::Login, None)?;
        if request.password != VALID_PASSWORD {
            return Err(ApiError::Unauthorized);
        }
        Ok(LoginResponse {
            token: format!("token-{}", request.username),
            id: Some(UserId::new("1")),
            username: Some(request.username.to_string()),
        })
    }

    async fn signup(&self, request: &SignupRequest<'_>) -> Result<SignupResponse, ApiError> {
        self.record(BackendCall::Signup, None)?;
        if request.username == TAKEN_USERNAME {
            return Err(ApiError::Status {
                status: 400,
                body: "User already exists".to_string(),
            });
        }
        Ok(SignupResponse {
            message: Some("User created successfully".to_string()),
            user: Some(CurrentUser {
                id: UserId::new("2"),
                username: request.username.to_string(),
            }),
        })
    }

    async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        self.record(BackendCall::Logout, Some(token))
    }
}

impl UserApi for FakeBackend {
    /// Profiles are derived from `token-{username}` tokens.
    async fn fetch_profile(&self, token: &SecretString, id: &UserId) -> Result<UserProfile, ApiError> {
        self.record(BackendCall::FetchProfile(id.clone()), Some(token))?;
        let username = token
            .expose_secret()
            .strip_prefix("token-")
            .unwrap_or("user")
            .to_string();
        Ok(UserProfile {
            id: id.clone(),
            email: format!("{username}@mail.com"),
            username,
            name: None,
        })
    }

    async fn delete_account(&self, token: &SecretString, id: &UserId) -> Result<(), ApiError> {
        self.record(BackendCall::DeleteAccount(id.clone()), Some(token))
    }
}

impl PaymentGateway for FakeBackend {
    async fn create_payment_intent(
        &self,
        token: &SecretString,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError> {
        self.record(
            BackendCall::PaymentIntent(request.amount, request.currency.clone()),
            Some(token),
        )?;
        Ok(PaymentIntent {
            client_secret: format!("pi_{}_secret", request.amount),
        })
    }
}

pub fn cart_item(id: i32, price: i64, quantity: i64) -> CartItem {
    CartItem {
        product_id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Decimal::from(price),
        quantity: Quantity::clamped(quantity),
        image: String::new(),
    }
}

pub fn product(id: i32, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Decimal::from(price),
        description: String::new(),
        category: "electronics".to_string(),
        image: String::new(),
        rating: None,
    }
}
