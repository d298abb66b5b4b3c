//! In-memory cart state.

use products_plus_core::{CartItem, ProductId, cart_item_count, cart_subtotal};
use rust_decimal::Decimal;

/// Where the current cart contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartSource {
    /// Nothing loaded yet, or the cart was reset.
    #[default]
    Empty,
    /// Read from the local store for an anonymous session.
    Local,
    /// Returned by the remote store for an authenticated session.
    Remote,
}

/// The cart for the current session.
///
/// Contents come from exactly one source at a time and are always replaced
/// wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<CartItem>,
    source: CartSource,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cart read from the local store.
    #[must_use]
    pub fn local(items: Vec<CartItem>) -> Self {
        Self::from_items(items, CartSource::Local)
    }

    /// A cart returned by the remote store.
    #[must_use]
    pub fn remote(items: Vec<CartItem>) -> Self {
        Self::from_items(items, CartSource::Remote)
    }

    fn from_items(items: Vec<CartItem>, source: CartSource) -> Self {
        Self {
            items: dedupe_by_product(items),
            source,
        }
    }

    /// Cart lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Where the contents came from.
    #[must_use]
    pub const fn source(&self) -> CartSource {
        self.source
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        cart_item_count(&self.items)
    }

    /// Sum of `price × quantity`, or `None` if the server sent totals that
    /// overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        cart_subtotal(&self.items)
    }
}

/// Keep product IDs unique: a repeated product folds its quantity into the
/// first line that mentions it.
fn dedupe_by_product(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut unique: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        match unique.iter_mut().find(|u| u.product_id == item.product_id) {
            Some(existing) => {
                tracing::warn!(product_id = %item.product_id, "Duplicate cart line merged");
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => unique.push(item),
        }
    }
    unique
}
