//! Cart commands.
//!
//! Every change goes through the cart session manager, which needs a logged-in
//! session. `show` also works anonymously and prints the locally stored cart.

use products_plus_core::{ProductId, Quantity};
use products_plus_storefront::error::Result;
use products_plus_storefront::services::cart::CartError;
use products_plus_storefront::state::{AppState, StorefrontCart};

use crate::output;

fn print(state: &AppState, cart: &StorefrontCart) {
    if let Some(message) = cart.message() {
        output::notice(message);
    }
    output::cart(cart.cart(), state.config().currency);
}

pub async fn show(state: &AppState) -> Result<()> {
    let mut cart = state.cart_session()?;
    cart.load().await?;
    print(state, &cart);
    Ok(())
}

pub async fn add(state: &AppState, id: ProductId, quantity: i64) -> Result<()> {
    let quantity = Quantity::try_new(quantity).map_err(CartError::from)?;
    let mut cart = state.cart_session()?;
    if !cart.session().is_authenticated() {
        return Err(CartError::NotAuthenticated.into());
    }

    let product = state.catalog().get_product(id).await?;
    cart.add_item(&product, quantity).await?;
    output::notice(&format!("Added {} x {}.", quantity, product.title));
    print(state, &cart);
    Ok(())
}

pub async fn update(state: &AppState, id: ProductId, quantity: i64) -> Result<()> {
    let mut cart = state.cart_session()?;
    cart.update_quantity(id, quantity).await?;
    print(state, &cart);
    Ok(())
}

pub async fn remove(state: &AppState, id: ProductId) -> Result<()> {
    let mut cart = state.cart_session()?;
    cart.remove_item(id).await?;
    print(state, &cart);
    Ok(())
}

pub async fn clear(state: &AppState) -> Result<()> {
    let mut cart = state.cart_session()?;
    cart.clear().await?;
    output::notice("Cart cleared.");
    Ok(())
}
