//! Checkout handoff.
//!
//! Translates the cart into the order request the checkout service accepts.

mod order;

pub use order::{OrderDraft, OrderLine};
