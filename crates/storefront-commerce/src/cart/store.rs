//! Cart store: owns the current state and fans changes out to observers.

use crate::cart::{reduce, CartAction, CartLineItem, CartState, SlotKey};
use crate::config::CartConfig;
use crate::error::CommerceError;
use crate::location::{Country, State};
use serde::Deserialize;
use storefront_cache::Cache;
use tracing::{debug, warn};

/// Receives every new cart state, synchronously, in registration order.
pub trait CartObserver {
    fn on_change(&mut self, state: &CartState);
}

impl<F> CartObserver for F
where
    F: FnMut(&CartState),
{
    fn on_change(&mut self, state: &CartState) {
        self(state)
    }
}

/// Single source of truth for the cart.
///
/// Built once at application start and passed by reference. Every mutation
/// runs the pure reducer, swaps in the new state, then notifies observers.
pub struct CartStore {
    state: CartState,
    config: CartConfig,
    observers: Vec<Box<dyn CartObserver>>,
}

impl CartStore {
    /// An empty store with no observers.
    pub fn new(config: CartConfig) -> Self {
        Self {
            state: CartState::empty(&config),
            config,
            observers: Vec::new(),
        }
    }

    /// Restore from `cache` and persist every later change back to it.
    pub fn open(cache: Cache, config: CartConfig) -> Self {
        let state = restore(&cache, &config);
        let persistence = CartPersistence::new(cache, config.storage_key.clone());
        let mut store = Self {
            state,
            config,
            observers: Vec::new(),
        };
        store.subscribe(persistence);
        store
    }

    /// Register an observer.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current snapshot.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Number of rows, as opposed to units.
    pub fn line_count(&self) -> usize {
        self.state.items.len()
    }

    /// Apply an action and broadcast the result.
    pub fn dispatch(&mut self, action: CartAction) -> &CartState {
        self.state = reduce(&self.state, action, &self.config);
        for observer in &mut self.observers {
            observer.on_change(&self.state);
        }
        &self.state
    }

    pub fn add(&mut self, item: CartLineItem) -> &CartState {
        self.dispatch(CartAction::Add(item))
    }

    pub fn update_quantity(&mut self, slot: SlotKey, quantity: i64) -> &CartState {
        self.dispatch(CartAction::UpdateQuantity { slot, quantity })
    }

    pub fn remove(&mut self, slot: SlotKey) -> &CartState {
        self.dispatch(CartAction::Remove(slot))
    }

    pub fn remove_by_index(&mut self, index: usize) -> &CartState {
        self.dispatch(CartAction::RemoveByIndex(index))
    }

    pub fn clear(&mut self) -> &CartState {
        self.dispatch(CartAction::Clear)
    }

    pub fn update_shipping_location(
        &mut self,
        country: Country,
        state: Option<State>,
    ) -> &CartState {
        self.dispatch(CartAction::UpdateShippingLocation { country, state })
    }

    /// Push decoded deep-link items through `add`, one at a time.
    pub fn hydrate(&mut self, items: impl IntoIterator<Item = CartLineItem>) -> &CartState {
        for item in items {
            self.add(item);
        }
        &self.state
    }
}

/// Writes every state to the cache under one key.
pub struct CartPersistence {
    cache: Cache,
    key: String,
}

impl CartPersistence {
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }
}

impl CartObserver for CartPersistence {
    fn on_change(&mut self, state: &CartState) {
        // In-memory state stays authoritative when the write fails.
        if let Err(e) = self.cache.set(&self.key, state) {
            warn!(storage_key = %self.key, error = %e, "failed to persist cart");
        }
    }
}

/// Only the item list of a stored cart is trusted.
#[derive(Deserialize)]
struct StoredCart {
    items: Vec<CartLineItem>,
}

/// Read the persisted cart, degrading to empty on any failure.
pub fn restore(cache: &Cache, config: &CartConfig) -> CartState {
    match read_items(cache, &config.storage_key) {
        Ok(items) => {
            debug!(storage_key = %config.storage_key, items = items.len(), "restored cart");
            CartState::from_items(items, config)
        }
        Err(e) => {
            warn!(storage_key = %config.storage_key, error = %e, "discarding stored cart");
            CartState::empty(config)
        }
    }
}

fn read_items(cache: &Cache, key: &str) -> Result<Vec<CartLineItem>, CommerceError> {
    let Some(stored) = cache.get::<StoredCart>(key)? else {
        return Ok(Vec::new());
    };
    Ok(stored
        .items
        .into_iter()
        .filter(|item| item.quantity >= 1)
        .collect())
}
