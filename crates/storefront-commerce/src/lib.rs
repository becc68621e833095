//! Storefront cart engine and domain types.
//!
//! This crate provides the client-side commerce core of the storefront:
//!
//! - **Cart**: line items, slot identity, a pure reducer and the price summary
//! - **Store**: an explicitly constructed cart store with observers and persistence
//! - **Locations**: country/state shipping reference data
//! - **Checkout**: translation of the cart into an order request
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//! use storefront_cache::Cache;
//!
//! let mut store = CartStore::open(Cache::file(".storefront")?, CartConfig::default());
//!
//! store.add(
//!     CartLineItem::product("prod-1", LocalizedText::new("en", "Mug"), 2, Money::new(1250))
//!         .with_variant(SelectedVariant::new("color", LocalizedText::new("en", "Blue"))),
//! );
//!
//! let summary = &store.state().summary;
//! println!("Total: {}", summary.total.display(Currency::USD));
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod text;

pub mod cart;
pub mod checkout;
pub mod config;
pub mod location;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::text::{LocalizedText, SelectedVariant};

    // Cart
    pub use crate::cart::{
        reduce, CartAction, CartLineItem, CartObserver, CartPersistence, CartState, CartStore,
        CartSummary, ItemType, PackageItem, SlotKey,
    };

    // Configuration and reference data
    pub use crate::config::CartConfig;
    pub use crate::location::{Country, LocationCatalog, State};

    // Checkout
    pub use crate::checkout::{OrderDraft, OrderLine};
}
