//! Cart session shared between tasks.

use std::sync::Arc;

use products_plus_core::{ProductId, Quantity};
use tokio::sync::{Mutex, MutexGuard};

use super::{CartError, CartSessionManager};
use crate::api::{CartStore, Product};
use crate::models::CartState;
use crate::storage::LocalStore;

/// A [`CartSessionManager`] behind an async mutex.
///
/// Operations queue on the lock, so a remove and its re-fetch never
/// interleave with another mutation. Methods return snapshots of the cart.
pub struct SharedCartSession<B, L> {
    inner: Arc<Mutex<CartSessionManager<B, L>>>,
}

impl<B, L> Clone for SharedCartSession<B, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, L> std::fmt::Debug for SharedCartSession<B, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCartSession").finish_non_exhaustive()
    }
}

impl<B, L> SharedCartSession<B, L> {
    /// Wrap `manager` so clones of the handle share it.
    #[must_use]
    pub fn new(manager: CartSessionManager<B, L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Exclusive access to the manager, e.g. for login and logout.
    pub async fn lock(&self) -> MutexGuard<'_, CartSessionManager<B, L>> {
        self.inner.lock().await
    }
}

impl<B: CartStore, L: LocalStore> SharedCartSession<B, L> {
    /// Snapshot of the current cart.
    pub async fn cart(&self) -> CartState {
        self.inner.lock().await.cart().clone()
    }

    /// Sum of quantities in the current cart.
    pub async fn item_count(&self) -> u64 {
        self.inner.lock().await.item_count()
    }

    /// See [`CartSessionManager::load`].
    ///
    /// # Errors
    ///
    /// Same as [`CartSessionManager::load`].
    pub async fn load(&self) -> Result<CartState, CartError> {
        self.inner.lock().await.load().await.cloned()
    }

    /// See [`CartSessionManager::add_item`].
    ///
    /// # Errors
    ///
    /// Same as [`CartSessionManager::add_item`].
    pub async fn add_item(&self, product: &Product, quantity: Quantity) -> Result<CartState, CartError> {
        self.inner
            .lock()
            .await
            .add_item(product, quantity)
            .await
            .cloned()
    }

    /// See [`CartSessionManager::update_quantity`].
    ///
    /// # Errors
    ///
    /// Same as [`CartSessionManager::update_quantity`].
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartState, CartError> {
        self.inner
            .lock()
            .await
            .update_quantity(product_id, quantity)
            .await
            .cloned()
    }

    /// See [`CartSessionManager::remove_item`].
    ///
    /// # Errors
    ///
    /// Same as [`CartSessionManager::remove_item`].
    pub async fn remove_item(&self, product_id: ProductId) -> Result<CartState, CartError> {
        self.inner
            .lock()
            .await
            .remove_item(product_id)
            .await
            .cloned()
    }

    /// See [`CartSessionManager::clear`].
    ///
    /// # Errors
    ///
    /// Same as [`CartSessionManager::clear`].
    pub async fn clear(&self) -> Result<(), CartError> {
        self.inner.lock().await.clear().await
    }
}
