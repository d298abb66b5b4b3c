//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart session manager: session state, remote cart, login/logout
//! - `auth` - Login and signup input validation, account registration
//! - `catalog` - Product search
//! - `checkout` - Order summary and payment intent creation
//! - `profile` - Account profile and account deletion

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod profile;
