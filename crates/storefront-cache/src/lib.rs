//! Key-value persistence layer for storefront client state.
//!
//! Provides a small, ergonomic API for storing whole JSON documents under a
//! fixed key, the way a browser storefront writes its cart to local storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_cache::Cache;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct CartState {
//!     items: Vec<CartLineItem>,
//! }
//!
//! let cache = Cache::file(".storefront")?;
//!
//! // Store a value
//! cache.set("cart", &state)?;
//!
//! // Retrieve a value
//! let state: Option<CartState> = cache.get("cart")?;
//!
//! // Delete a value
//! cache.delete("cart")?;
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

#[cfg(target_arch = "wasm32")]
pub use backend::SpinBackend;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileBackend, KvBackend, MemoryBackend};
}
