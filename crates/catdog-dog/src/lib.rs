//! Client for TheDogAPI.
//!
//! Provides strongly typed resource operations for the dog image provider:
//! image search and upload, breeds, favourites, and votes. Unlike the cat
//! provider, the dog API has no category resource.

#![deny(missing_docs)]

pub mod client;

pub use client::{DogClient, DogClientBuilder};

/// Convenient result alias using the shared error type.
pub type Result<T> = catdog_core::Result<T>;
