//! Products Plus storefront client library.
//!
//! Keeps a shopper's cart consistent between the local store, the in-memory
//! cart and the remote cart service, and provides the catalog, auth and
//! checkout flows built around it.
//!
//! The entry point is [`state::AppState`], which hands out a
//! [`services::cart::CartSessionManager`] for the persisted session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
