//! Client for TheCatAPI.
//!
//! Provides strongly typed resource operations for the cat image provider:
//! image search and upload, breeds, categories, favourites, and votes.

#![deny(missing_docs)]

pub mod client;

pub use client::{CatClient, CatClientBuilder};

/// Convenient result alias using the shared error type.
pub type Result<T> = catdog_core::Result<T>;
