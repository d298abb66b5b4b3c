//! Login, signup, logout and the account profile.

use products_plus_storefront::error::{AppError, Result};
use products_plus_storefront::services::auth::SignupForm;
use products_plus_storefront::state::AppState;

use crate::output;

pub async fn login(state: &AppState, username: &str, password: &str) -> Result<()> {
    let mut cart = state.cart_session()?;
    let user = cart.login(username, password).await?;

    output::notice(&format!("Logged in as {}.", user.username));
    if let Some(message) = cart.message() {
        output::notice(message);
    } else {
        output::cart(cart.cart(), state.config().currency);
    }
    Ok(())
}

pub async fn signup(state: &AppState, form: &SignupForm) -> Result<()> {
    let response = state.auth().signup(form).await?;
    output::notice(
        response
            .message
            .as_deref()
            .unwrap_or("Account created. You can now log in."),
    );
    Ok(())
}

pub async fn logout(state: &AppState) -> Result<()> {
    let mut cart = state.cart_session()?;
    if !cart.session().is_authenticated() {
        output::notice("Not logged in.");
        return Ok(());
    }
    cart.logout().await?;
    output::notice("Logged out.");
    Ok(())
}

pub async fn profile(state: &AppState) -> Result<()> {
    let mut cart = state.cart_session()?;
    let profile = state.profile().fetch(&mut cart).await?;
    output::profile(&profile);
    Ok(())
}

pub async fn delete(state: &AppState, confirmed: bool) -> Result<()> {
    if !confirmed {
        return Err(AppError::BadRequest(
            "Deleting the account cannot be undone. Re-run with --yes to confirm.".to_string(),
        ));
    }
    let mut cart = state.cart_session()?;
    state.profile().delete_account(&mut cart).await?;
    output::notice("Account deleted. You have been logged out.");
    Ok(())
}
