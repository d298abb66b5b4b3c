//! Core types for Products Plus.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod credentials;
pub mod email;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart::{CartItem, NewCartItem, cart_item_count, cart_subtotal};
pub use credentials::{CredentialError, Password, SignupField, Username};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use quantity::{Quantity, QuantityError};
