//! Command implementations.
//!
//! Each command builds what it needs from `AppState`, runs one operation
//! and prints the result.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod products;
