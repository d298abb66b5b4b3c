//! Checkout against the mock backend.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use products_plus_core::{ProductId, Quantity};
use products_plus_integration_tests::{MockBackend, PASSWORD, USERNAME};
use products_plus_storefront::models::keys;
use products_plus_storefront::services::checkout::{CheckoutError, CheckoutForm};
use products_plus_storefront::state::AppState;
use products_plus_storefront::storage::LocalStore;
use secrecy::ExposeSecret;
use tempfile::TempDir;

async fn setup() -> (MockBackend, AppState, TempDir) {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(backend.config(dir.path())).expect("app state");
    (backend, state, dir)
}

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "John Doe".to_string(),
        email: "john@gmail.com".to_string(),
        address: "7835 New Road, Kilcoole".to_string(),
    }
}

#[tokio::test]
async fn test_checkout_creates_intent_and_clears_cart() {
    let (backend, state, _dir) = setup().await;
    let mut cart = state.cart_session().expect("cart session");
    cart.login(USERNAME, PASSWORD).await.expect("login");
    let backpack = state
        .catalog()
        .get_product(ProductId::new(1))
        .await
        .expect("product");
    cart.add_item(&backpack, Quantity::clamped(2)).await.expect("add");

    let receipt = state
        .checkout()
        .place_order(&mut cart, &form())
        .await
        .expect("checkout");

    assert_eq!(receipt.summary.item_count, 2);
    assert_eq!(receipt.summary.subtotal.to_string(), "$219.90");
    assert_eq!(receipt.client_secret.expose_secret(), "pi_21990_secret_mock");
    assert_eq!(backend.payment_intents(), vec![(21990, "usd".to_string())]);
    assert!(cart.cart().is_empty());
    assert!(backend.cart_of(USERNAME).is_empty());
}

#[tokio::test]
async fn test_checkout_drops_stored_cart() {
    let (_backend, state, _dir) = setup().await;
    state
        .store()
        .set(keys::CART_ITEMS, r#"[{"productId":9,"title":"Drive","price":64,"quantity":1,"image":""}]"#)
        .expect("store cart");
    let mut cart = state.cart_session().expect("cart session");
    cart.login(USERNAME, PASSWORD).await.expect("login");
    let drive = state
        .catalog()
        .get_product(ProductId::new(9))
        .await
        .expect("product");
    cart.add_item(&drive, Quantity::MIN).await.expect("add");

    state
        .checkout()
        .place_order(&mut cart, &form())
        .await
        .expect("checkout");
    cart.logout().await.expect("logout");

    let mut anonymous = state.cart_session().expect("cart session");
    assert!(anonymous.load().await.expect("load").is_empty());
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let (backend, state, _dir) = setup().await;
    let mut cart = state.cart_session().expect("cart session");

    let err = state
        .checkout()
        .place_order(&mut cart, &form())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::NotAuthenticated));
    assert_eq!(backend.total_hits(), 0);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let (backend, state, _dir) = setup().await;
    let mut cart = state.cart_session().expect("cart session");
    cart.login(USERNAME, PASSWORD).await.expect("login");

    let err = state
        .checkout()
        .place_order(&mut cart, &form())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(backend.payment_intents().is_empty());
}

#[tokio::test]
async fn test_payment_failure_keeps_cart() {
    let (backend, state, _dir) = setup().await;
    let mut cart = state.cart_session().expect("cart session");
    cart.login(USERNAME, PASSWORD).await.expect("login");
    let shirt = state
        .catalog()
        .get_product(ProductId::new(2))
        .await
        .expect("product");
    cart.add_item(&shirt, Quantity::MIN).await.expect("add");

    backend.fail_next(StatusCode::SERVICE_UNAVAILABLE);
    let err = state
        .checkout()
        .place_order(&mut cart, &form())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Payment(_)));
    assert_eq!(cart.item_count(), 1);
    assert_eq!(backend.cart_of(USERNAME).len(), 1);
}
