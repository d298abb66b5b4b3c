//! Domain models for the storefront client.
//!
//! - [`session`] - who is signed in, persisted in the local store
//! - [`cart`] - the in-memory cart and where it came from

pub mod cart;
pub mod session;

pub use cart::{CartSource, CartState};
pub use session::{CurrentUser, Session, keys};
