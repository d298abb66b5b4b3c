//! Cart session manager.
//!
//! Keeps the in-memory cart consistent with the current session:
//!
//! - **Anonymous**: the cart is read from the local store on `load()` and is
//!   read-only. Every mutation returns [`CartError::NotAuthenticated`].
//! - **Authenticated**: the remote store is authoritative. Mutations go to
//!   the store and the cart is replaced with what the store returns. The
//!   local store is never consulted as a fallback.
//!
//! A 401 from the store ends the session: the token is discarded and the
//! cart is emptied, without repopulating it from the local store.
//!
//! Failures keep the last good cart (an empty one for `load()`) and record a
//! user-visible message. Nothing is retried.
//!
//! Every state-changing method takes `&mut self`, so a single manager runs
//! one operation (including any trailing re-fetch) at a time. Use
//! [`SharedCartSession`] when several tasks need the same cart.

mod error;
mod shared;

pub use error::{CartError, CartOperation, LOGIN_REQUIRED_MESSAGE, SESSION_EXPIRED_MESSAGE};
pub use shared::SharedCartSession;

use products_plus_core::{CartItem, ProductId, Quantity};
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, AuthApi, CartStore, LoginRequest, Product};
use crate::error::{add_breadcrumb, clear_sentry_user, report_error, set_sentry_user};
use crate::models::{CartState, CurrentUser, Session, keys};
use crate::services::auth::{AuthError, validate_login};
use crate::storage::{LocalStore, StorageError};

/// Owns the session and the cart for one user of the storefront.
pub struct CartSessionManager<B, L> {
    backend: B,
    local: L,
    session: Session,
    cart: CartState,
    message: Option<String>,
}

impl<B, L> std::fmt::Debug for CartSessionManager<B, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSessionManager")
            .field("session", &self.session)
            .field("cart", &self.cart)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl<B, L: LocalStore> CartSessionManager<B, L> {
    /// Create a manager for an explicit session. The cart starts empty.
    #[must_use]
    pub fn new(backend: B, local: L, session: Session) -> Self {
        Self {
            backend,
            local,
            session,
            cart: CartState::empty(),
            message: None,
        }
    }

    /// Create a manager for the session persisted in `local`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the local store cannot be read.
    pub fn restore(backend: B, local: L) -> Result<Self, StorageError> {
        let session = Session::restore(&local)?;
        if let Some(user) = session.user() {
            set_sentry_user(&user.id, &user.username);
        }
        Ok(Self::new(backend, local, session))
    }

    /// The current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Sum of quantities in the current cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Message describing the last failure, if the last operation failed.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The backend the manager talks to.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The local store backing the session.
    #[must_use]
    pub const fn local(&self) -> &L {
        &self.local
    }

    /// Token of an authenticated session, or `NotAuthenticated`.
    fn require_token(&mut self, operation: CartOperation) -> Result<SecretString, CartError> {
        if let Some(token) = self.session.token() {
            return Ok(token.clone());
        }
        info!(operation = operation.as_str(), "Cart operation needs login");
        self.message = Some(LOGIN_REQUIRED_MESSAGE.to_string());
        Err(CartError::NotAuthenticated)
    }

    /// End the session after the backend rejected its token.
    pub(crate) fn expire_session(&mut self) {
        warn!("Backend rejected session token, signing out");
        if let Err(e) = self.session.end(&self.local) {
            report_error(&e, "Failed to clear expired session from local store");
        }
        clear_sentry_user();
        self.cart = CartState::empty();
        self.message = Some(SESSION_EXPIRED_MESSAGE.to_string());
    }

    /// Drop the session and the in-memory cart without asking the backend.
    ///
    /// The stored anonymous cart is left alone and is not reloaded.
    pub(crate) fn end_session(&mut self) -> Result<(), StorageError> {
        self.cart = CartState::empty();
        self.message = None;
        clear_sentry_user();
        self.session.end(&self.local)
    }

    /// Record a failed remote call and convert it to a `CartError`.
    fn remote_failure(&mut self, operation: CartOperation, err: ApiError) -> CartError {
        if err.is_unauthorized() {
            self.expire_session();
            return CartError::NotAuthenticated;
        }

        report_error(&err, operation.failure_message());
        self.message = Some(operation.failure_message().to_string());
        CartError::NetworkFailure(err)
    }

    fn replace_with_remote(&mut self, items: Vec<CartItem>) {
        self.cart = CartState::remote(items);
        self.message = None;
    }

    /// Read the anonymous cart from the local store.
    fn load_local(&mut self) -> Result<&CartState, CartError> {
        match self.local.get_json::<Vec<CartItem>>(keys::CART_ITEMS) {
            Ok(Some(items)) => {
                self.cart = CartState::local(items);
                self.message = None;
            }
            Ok(None) => {
                self.cart = CartState::empty();
                self.message = None;
            }
            Err(StorageError::Json(e)) => {
                warn!(error = %e, "Ignoring unreadable stored cart");
                self.cart = CartState::empty();
                self.message = None;
            }
            Err(e) => {
                report_error(&e, "Failed to read stored cart");
                self.cart = CartState::empty();
                self.message = Some(CartOperation::Load.failure_message().to_string());
                return Err(e.into());
            }
        }
        Ok(&self.cart)
    }
}

impl<B: CartStore, L: LocalStore> CartSessionManager<B, L> {
    /// Load the cart for the current session.
    ///
    /// Authenticated sessions fetch from the remote store; on failure the
    /// cart becomes empty. Anonymous sessions read the local store; missing
    /// or unreadable data yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NetworkFailure` if the fetch fails,
    /// `CartError::NotAuthenticated` if the token was rejected, or
    /// `CartError::Storage` if the local store cannot be read.
    #[instrument(skip(self), fields(authenticated = self.session.is_authenticated()))]
    pub async fn load(&mut self) -> Result<&CartState, CartError> {
        let Some(token) = self.session.token().cloned() else {
            return self.load_local();
        };

        match self.backend.fetch_cart(&token).await {
            Ok(items) => {
                self.replace_with_remote(items);
                Ok(&self.cart)
            }
            Err(err) => {
                self.cart = CartState::empty();
                Err(self.remote_failure(CartOperation::Load, err))
            }
        }
    }

    /// Add a product to the cart. The store merges quantities for a product
    /// that is already present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` for anonymous sessions (the cart
    /// is unchanged) or `CartError::NetworkFailure` if the store call fails.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity = %quantity))]
    pub async fn add_item(
        &mut self,
        product: &Product,
        quantity: Quantity,
    ) -> Result<&CartState, CartError> {
        let token = self.require_token(CartOperation::Add)?;
        let product_id = product.id.to_string();
        add_breadcrumb("cart", "Add to cart", Some(&[("product_id", &product_id)]));

        match self
            .backend
            .add_item(&token, &product.to_cart_item(quantity))
            .await
        {
            Ok(items) => {
                self.replace_with_remote(items);
                Ok(&self.cart)
            }
            Err(err) => Err(self.remote_failure(CartOperation::Add, err)),
        }
    }

    /// Set the quantity of a cart line. Values below one are clamped to one,
    /// values above [`Quantity::MAX`] to the maximum, and the clamp is
    /// reported through [`message`](Self::message).
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` for anonymous sessions or
    /// `CartError::NetworkFailure` if the store call fails.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<&CartState, CartError> {
        let token = self.require_token(CartOperation::Update)?;

        let (quantity, notice) = match Quantity::try_new(quantity) {
            Ok(quantity) => (quantity, None),
            Err(e) => {
                let err = CartError::from(e);
                warn!(error = %err, "Clamping cart quantity");
                (Quantity::clamped(quantity), Some(err.to_string()))
            }
        };

        match self
            .backend
            .update_quantity(&token, product_id, quantity)
            .await
        {
            Ok(items) => {
                self.replace_with_remote(items);
                self.message = notice;
                Ok(&self.cart)
            }
            Err(err) => Err(self.remote_failure(CartOperation::Update, err)),
        }
    }

    /// Remove a product from the cart, then re-fetch the whole cart.
    ///
    /// The local cart is not touched until the re-fetch succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` for anonymous sessions or
    /// `CartError::NetworkFailure` if either round trip fails.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, product_id: ProductId) -> Result<&CartState, CartError> {
        let token = self.require_token(CartOperation::Remove)?;
        let id = product_id.to_string();
        add_breadcrumb("cart", "Remove from cart", Some(&[("product_id", &id)]));

        if let Err(err) = self.backend.remove_item(&token, product_id).await {
            return Err(self.remote_failure(CartOperation::Remove, err));
        }

        match self.backend.fetch_cart(&token).await {
            Ok(items) => {
                self.replace_with_remote(items);
                Ok(&self.cart)
            }
            Err(err) => Err(self.remote_failure(CartOperation::Remove, err)),
        }
    }

    /// Delete the whole cart with a single store call and empty the local
    /// cart without re-fetching. Any cart kept in the local store is dropped
    /// too, so it cannot reappear after logout.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` for anonymous sessions or
    /// `CartError::NetworkFailure` if the store call fails.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        let token = self.require_token(CartOperation::Clear)?;
        add_breadcrumb("cart", "Clear cart", None);

        match self.backend.clear_cart(&token).await {
            Ok(()) => {
                self.cart = CartState::empty();
                self.message = None;
                if let Err(e) = self.local.remove(keys::CART_ITEMS) {
                    report_error(&e, "Failed to remove stored cart");
                }
                Ok(())
            }
            Err(err) => Err(self.remote_failure(CartOperation::Clear, err)),
        }
    }
}

impl<B: CartStore + AuthApi, L: LocalStore> CartSessionManager<B, L> {
    /// Log in, persist the session and load the user's remote cart.
    ///
    /// A failed cart load does not fail the login; it is reported through
    /// [`message`](Self::message).
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the input is invalid, the credentials are
    /// rejected, or the session cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let (username, password) = validate_login(username, password)?;

        let response = self
            .backend
            .login(&LoginRequest {
                username: username.as_str(),
                password: password.expose(),
            })
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::Api(other),
            })?;

        let user = response.user(username.as_str());
        self.session
            .establish(&self.local, SecretString::from(response.token), user.clone())?;
        set_sentry_user(&user.id, &user.username);
        info!(user_id = %user.id, "Logged in");

        if let Err(e) = self.load().await {
            warn!(error = %e, "Cart load after login failed");
        }

        Ok(user)
    }

    /// Log out: tell the backend (best effort), discard the token and empty
    /// the cart. The anonymous cart is not reloaded from the local store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the persisted session cannot be
    /// removed. The in-memory session is anonymous regardless.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(token) = self.session.token().cloned() {
            if let Err(e) = self.backend.logout(&token).await {
                warn!(error = %e, "Backend logout failed, discarding token locally");
            }
        }

        self.end_session()?;
        info!("Logged out");
        Ok(())
    }
}
