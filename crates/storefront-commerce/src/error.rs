//! Commerce error types.
//!
//! Cart mutations never fail; these errors come from the edges around the
//! engine (reading storage, loading configuration, resolving locations) and
//! are mostly logged and degraded rather than returned to UI callers.

use thiserror::Error;

/// Errors that can occur around the cart engine.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Country code not present in the location catalog.
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// State code not present for the country.
    #[error("Unknown state {state} for country {country}")]
    UnknownState { country: String, state: String },

    /// Persistence layer error.
    #[error("Storage error: {0}")]
    Storage(#[from] storefront_cache::CacheError),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
