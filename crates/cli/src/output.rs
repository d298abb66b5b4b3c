//! Terminal output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use products_plus_core::{CurrencyCode, Price};
use products_plus_storefront::api::{Product, UserProfile};
use products_plus_storefront::models::CartState;
use products_plus_storefront::services::checkout::CheckoutReceipt;
use secrecy::ExposeSecret;

pub fn products(products: &[Product], currency: CurrencyCode) {
    for product in products {
        println!(
            "{:>4}  {:>10}  {}",
            product.id,
            Price::new(product.price, currency).to_string(),
            product.title
        );
    }
}

pub fn product(product: &Product, currency: CurrencyCode) {
    println!("{}", product.title);
    println!("  id:       {}", product.id);
    println!("  price:    {}", Price::new(product.price, currency));
    println!("  category: {}", product.category);
    if let Some(rating) = product.rating {
        println!("  rating:   {:.1} ({} reviews)", rating.rate, rating.count);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn cart(cart: &CartState, currency: CurrencyCode) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>4}  {:>3} x {:>10}  {}",
            item.product_id,
            item.quantity,
            Price::new(item.price, currency).to_string(),
            item.title
        );
    }
    let subtotal = cart.subtotal().map_or_else(
        || "unavailable".to_string(),
        |amount| Price::new(amount, currency).to_string(),
    );
    println!("{} items, subtotal {subtotal}", cart.item_count());
}

pub fn receipt(receipt: &CheckoutReceipt) {
    println!(
        "Order for {} <{}>: {} items, total {}",
        receipt.name, receipt.email, receipt.summary.item_count, receipt.summary.subtotal
    );
    println!("Payment client secret: {}", receipt.client_secret.expose_secret());
    println!("Complete payment in the provider's payment form.");
}

pub fn profile(profile: &UserProfile) {
    println!("Username: {}", profile.username);
    println!("Email:    {}", profile.email);
    if let Some(name) = &profile.name {
        println!("Name:     {name}");
    }
}

pub fn notice(message: &str) {
    println!("{message}");
}

pub fn error(message: &str) {
    eprintln!("error: {message}");
}
