//! Per-provider host and credential-injection profiles.
//!
//! Each upstream API is described by an explicit [`Provider`] profile rather
//! than inferred from the client type at runtime: the profile names the base
//! host, the environment variable consulted for the API key, and the way the
//! key travels on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Header used when the key travels as an HTTP header.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query parameter used when the key travels in the query string.
pub const API_KEY_PARAM: &str = "api_key";

/// Supported upstream pet-image providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// TheCatAPI
    Cat,
    /// TheDogAPI
    Dog,
}

/// How the API key is attached to outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// Key sent as the `x-api-key` request header
    Header,
    /// Key appended as the `api_key` query parameter
    Query,
}

impl Provider {
    /// Returns the provider name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Dog => "dog",
        }
    }

    /// Returns all available providers.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Cat, Self::Dog]
    }

    /// Base URL of the provider's REST API, version prefix included.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Cat => "https://api.thecatapi.com/v1",
            Self::Dog => "https://api.thedogapi.com/v1",
        }
    }

    /// Environment variable consulted when no API key is given explicitly.
    #[must_use]
    pub const fn env_var(&self) -> &'static str {
        match self {
            Self::Cat => "CAT_API_KEY",
            Self::Dog => "DOG_API_KEY",
        }
    }

    /// How this provider expects the API key to be attached.
    #[must_use]
    pub const fn credential_mode(&self) -> CredentialMode {
        match self {
            Self::Cat => CredentialMode::Query,
            Self::Dog => CredentialMode::Header,
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cat" => Ok(Self::Cat),
            "dog" => Ok(Self::Dog),
            _ => Err(Error::UnsupportedProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
