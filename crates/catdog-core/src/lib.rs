//! # catdog-core
//!
//! Core types and utilities shared by the pet-image API clients.
//!
//! This crate provides the error taxonomy, provider profiles, HTTP client
//! plumbing, and resource models used by the `catdog-cat` and `catdog-dog`
//! provider crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`provider`] - Per-provider host and credential-injection profiles
//! - [`client`] - HTTP client, builder, and request dispatch
//! - [`models`] - Resource models decoded from provider responses
//! - [`query`] - Query parameter builder
//! - [`storage`] - Helpers for saving fetched content to disk

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod models;
pub mod provider;
pub mod query;
pub mod storage;

// Re-export commonly used types
pub use client::{ApiClient, ApiClientBuilder, ClientConfig};
pub use error::{Error, Result};
pub use provider::{CredentialMode, Provider};
