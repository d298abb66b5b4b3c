//! Checkout command.

use products_plus_storefront::error::Result;
use products_plus_storefront::services::checkout::CheckoutForm;
use products_plus_storefront::state::AppState;

use crate::output;

pub async fn run(state: &AppState, form: &CheckoutForm) -> Result<()> {
    let mut cart = state.cart_session()?;
    if cart.session().is_authenticated() {
        cart.load().await?;
    }

    let receipt = state.checkout().place_order(&mut cart, form).await?;
    output::receipt(&receipt);
    Ok(())
}
