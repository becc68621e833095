//! Cart state engine.
//!
//! A pure reducer over line items ([`reduce`]), the summary it recomputes on
//! every action ([`CartSummary`]), and a store that broadcasts each new state
//! to observers, one of which persists it ([`CartStore`], [`CartPersistence`]).

mod item;
mod reducer;
mod store;
mod summary;

pub use item::{CartLineItem, ItemType, PackageItem, SlotKey};
pub use reducer::{reduce, CartAction, CartState};
pub use store::{restore, CartObserver, CartPersistence, CartStore};
pub use summary::{shipping_cost, CartSummary};
