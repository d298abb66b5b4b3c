//! Products Plus Core - Shared domain types.
//!
//! This crate provides the types shared by every Products Plus component:
//! - `storefront` - Cart session, catalog and checkout client library
//! - `cli` - Terminal front end for the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, cart items and
//!   login/signup input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
