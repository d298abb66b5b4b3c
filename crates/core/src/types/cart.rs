//! Cart line items as exchanged with the remote cart store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductId, Quantity};

/// A single line in a cart.
///
/// Wire format is camelCase JSON with `price` as a JSON number:
///
/// ```json
/// {"productId": 1, "title": "Backpack", "price": 109.95, "quantity": 2, "image": "https://..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: Quantity,
    pub image: String,
}

impl CartItem {
    /// Price of the whole line (`price × quantity`), or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity.get()))
    }
}

/// Body of an add-to-cart request.
///
/// The store defaults a missing quantity to one, so `quantity` is only sent
/// when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

/// Sum of quantities across cart lines.
#[must_use]
pub fn cart_item_count(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity.get())).sum()
}

/// Sum of line totals across cart lines.
///
/// Prices come from the server, so the sum is checked: `None` means some line
/// or the total overflowed.
#[must_use]
pub fn cart_subtotal(items: &[CartItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.line_total()?))
}
