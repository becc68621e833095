//! Pure cart reducer: state in, action, state out.

use crate::cart::{CartLineItem, CartSummary, SlotKey};
use crate::config::CartConfig;
use crate::location::{Country, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The whole cart: the unit of persistence and of change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartLineItem>,
    pub summary: CartSummary,
}

impl CartState {
    /// An empty cart.
    pub fn empty(config: &CartConfig) -> Self {
        Self::from_items(Vec::new(), config)
    }

    /// Build a state from trusted items, with no location selected.
    pub fn from_items(items: Vec<CartLineItem>, config: &CartConfig) -> Self {
        let summary = CartSummary::compute(&items, None, None, config);
        Self { items, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the row occupying `slot`.
    pub fn find(&self, slot: &SlotKey) -> Option<usize> {
        self.items.iter().position(|row| slot.identifies(row))
    }

    fn with_items(&self, items: Vec<CartLineItem>, config: &CartConfig) -> Self {
        let summary = CartSummary::compute(
            &items,
            self.summary.selected_country.as_ref(),
            self.summary.selected_state.as_ref(),
            config,
        );
        Self { items, summary }
    }
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Merge into the matching slot, or append a new row.
    Add(CartLineItem),
    /// Replace the quantity of a slot; below 1 behaves as `Remove`.
    UpdateQuantity { slot: SlotKey, quantity: i64 },
    /// Drop every row the key selects.
    Remove(SlotKey),
    /// Drop the row at a position.
    RemoveByIndex(usize),
    /// Drop all rows.
    Clear,
    /// Select a shipping destination.
    UpdateShippingLocation {
        country: Country,
        state: Option<State>,
    },
}

/// Apply `action` to `state`, returning a brand-new state.
///
/// The input is never modified and the summary is always recomputed.
pub fn reduce(state: &CartState, action: CartAction, config: &CartConfig) -> CartState {
    match action {
        CartAction::Add(item) => add(state, item, config),
        CartAction::UpdateQuantity { slot, quantity } => {
            update_quantity(state, slot, quantity, config)
        }
        CartAction::Remove(slot) => remove(state, &slot, config),
        CartAction::RemoveByIndex(index) => remove_by_index(state, index, config),
        CartAction::Clear => state.with_items(Vec::new(), config),
        CartAction::UpdateShippingLocation { country, state: region } => {
            let summary =
                CartSummary::compute(&state.items, Some(&country), region.as_ref(), config);
            CartState {
                items: state.items.clone(),
                summary,
            }
        }
    }
}

fn add(state: &CartState, mut item: CartLineItem, config: &CartConfig) -> CartState {
    if item.quantity < 1 {
        debug!(quantity = item.quantity, "ignoring add with non-positive quantity");
        return state.with_items(state.items.clone(), config);
    }

    let mut items = state.items.clone();
    match items.iter_mut().find(|row| row.same_slot(&item)) {
        Some(row) => {
            row.quantity = row.quantity.saturating_add(item.quantity);
        }
        None => {
            item.item_type = item.inferred_type();
            items.push(item);
        }
    }
    state.with_items(items, config)
}

fn update_quantity(
    state: &CartState,
    slot: SlotKey,
    quantity: i64,
    config: &CartConfig,
) -> CartState {
    if quantity < 1 {
        return remove(state, &slot, config);
    }

    let Some(index) = state.find(&slot) else {
        debug!(%slot, "quantity update for a slot not in the cart");
        return state.with_items(state.items.clone(), config);
    };

    let mut items = state.items.clone();
    items[index].quantity = quantity;
    state.with_items(items, config)
}

fn remove(state: &CartState, slot: &SlotKey, config: &CartConfig) -> CartState {
    let items: Vec<CartLineItem> = state
        .items
        .iter()
        .filter(|row| !slot.selects(row))
        .cloned()
        .collect();
    state.with_items(items, config)
}

fn remove_by_index(state: &CartState, index: usize, config: &CartConfig) -> CartState {
    let mut items = state.items.clone();
    if index < items.len() {
        items.remove(index);
    } else {
        warn!(index, len = items.len(), "remove by index out of range");
    }
    state.with_items(items, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;
    use crate::money::Money;
    use crate::text::{LocalizedText, SelectedVariant};
    use crate::cart::ItemType;
    use proptest::prelude::*;

    fn red() -> SelectedVariant {
        SelectedVariant::new("color", LocalizedText::new("en", "red").with("ar", "أحمر"))
    }

    fn medium() -> SelectedVariant {
        SelectedVariant::new("size", LocalizedText::new("en", "M"))
    }

    fn product(id: &str, quantity: i64) -> CartLineItem {
        CartLineItem::product(id, LocalizedText::new("en", id), quantity, Money::new(1000))
    }

    fn apply(state: &CartState, actions: Vec<CartAction>) -> CartState {
        let config = CartConfig::default();
        actions
            .into_iter()
            .fold(state.clone(), |s, a| reduce(&s, a, &config))
    }

    fn empty() -> CartState {
        CartState::empty(&CartConfig::default())
    }

    #[test]
    fn test_add_merges_same_slot() {
        let state = apply(
            &empty(),
            vec![
                CartAction::Add(product("P", 1).with_variant(red())),
                CartAction::Add(product("P", 2).with_variant(red())),
            ],
        );
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 3);
        assert_eq!(state.summary.items_count, 3);
    }

    #[test]
    fn test_add_distinct_variants_appends() {
        let state = apply(
            &empty(),
            vec![
                CartAction::Add(product("P", 1).with_variant(red())),
                CartAction::Add(product("P", 1).with_variant(red()).with_variant(medium())),
            ],
        );
        assert_eq!(state.items.len(), 2);
    }

    #[test]
    fn test_add_tags_item_type() {
        let mut item = CartLineItem::package(
            "K",
            LocalizedText::new("en", "Bundle"),
            1,
            Money::new(5000),
            vec![],
        );
        item.item_type = ItemType::Product;
        let state = apply(&empty(), vec![CartAction::Add(item)]);
        assert_eq!(state.items[0].item_type, ItemType::Package);
    }

    #[test]
    fn test_add_does_not_mutate_input_state() {
        let before = apply(&empty(), vec![CartAction::Add(product("P", 1))]);
        let snapshot = before.clone();
        let after = reduce(&before, CartAction::Add(product("P", 4)), &CartConfig::default());
        assert_eq!(before, snapshot);
        assert_eq!(after.items[0].quantity, 5);
    }

    #[test]
    fn test_update_quantity_replaces() {
        let state = apply(
            &empty(),
            vec![
                CartAction::Add(product("P", 1).with_variant(red())),
                CartAction::UpdateQuantity {
                    slot: SlotKey::product("P", vec![red()]),
                    quantity: 7,
                },
            ],
        );
        assert_eq!(state.items[0].quantity, 7);
    }

    #[test]
    fn test_update_quantity_zero_removes_row() {
        let state = apply(
            &empty(),
            vec![
                CartAction::Add(product("P", 2)),
                CartAction::Add(product("Q", 1)),
                CartAction::UpdateQuantity {
                    slot: SlotKey::product("P", vec![]),
                    quantity: 0,
                },
            ],
        );
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].product_id, Some(ProductId::new("Q")));
    }

    #[test]
    fn test_update_quantity_missing_slot_is_noop() {
        let before = apply(&empty(), vec![CartAction::Add(product("P", 2))]);
        let after = apply(
            &before,
            vec![CartAction::UpdateQuantity {
                slot: SlotKey::product("Z", vec![]),
                quantity: 9,
            }],
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_quantity_needs_full_variant_match() {
        let before = apply(
            &empty(),
            vec![CartAction::Add(product("P", 2).with_variant(red()).with_variant(medium()))],
        );
        let after = apply(
            &before,
            vec![CartAction::UpdateQuantity {
                slot: SlotKey::product("P", vec![red()]),
                quantity: 9,
            }],
        );
        assert_eq!(after.items[0].quantity, 2);
    }

    // Removal selects by variant subset while add/update need set equality.
    // Kept deliberately; changing either side needs product sign-off.
    #[test]
    fn test_remove_subset_asymmetry() {
        let row = product("P", 1).with_variant(red()).with_variant(medium());
        let state = apply(&empty(), vec![CartAction::Add(row)]);

        let merged = apply(&state, vec![CartAction::Add(product("P", 1).with_variant(red()))]);
        assert_eq!(merged.items.len(), 2, "add must not merge a subset selection");

        let removed = apply(
            &state,
            vec![CartAction::Remove(SlotKey::product("P", vec![red()]))],
        );
        assert!(removed.is_empty(), "remove must drop the superset row");
    }

    #[test]
    fn test_remove_package_by_id_only() {
        let bundle = CartLineItem::package("K", LocalizedText::default(), 1, Money::new(100), vec![]);
        let state = apply(
            &empty(),
            vec![
                CartAction::Add(bundle),
                CartAction::Add(product("P", 1)),
                CartAction::Remove(SlotKey::package("K")),
            ],
        );
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].item_type, ItemType::Product);
    }

    #[test]
    fn test_remove_by_index() {
        let state = apply(
            &empty(),
            vec![CartAction::Add(product("P", 1)), CartAction::Add(product("Q", 1))],
        );
        let removed = apply(&state, vec![CartAction::RemoveByIndex(0)]);
        assert_eq!(removed.items[0].product_id, Some(ProductId::new("Q")));

        let unchanged = apply(&state, vec![CartAction::RemoveByIndex(5)]);
        assert_eq!(unchanged, state);
    }

    #[test]
    fn test_clear() {
        let state = apply(
            &empty(),
            vec![CartAction::Add(product("P", 3)), CartAction::Clear],
        );
        assert!(state.is_empty());
        assert_eq!(state.summary.items_count, 0);
    }

    #[test]
    fn test_location_survives_later_mutations() {
        let country = Country::new("US", Money::new(999));
        let state = apply(
            &empty(),
            vec![
                CartAction::UpdateShippingLocation {
                    country: country.clone(),
                    state: Some(State::new("CA", Money::new(1500))),
                },
                CartAction::Add(product("P", 10)),
            ],
        );
        assert_eq!(state.summary.shipping_cost, Money::new(1500));
        assert_eq!(state.summary.selected_country, Some(country));
    }

    proptest! {
        #[test]
        fn prop_repeated_adds_merge(quantities in proptest::collection::vec(1i64..50, 1..20)) {
            let actions = quantities
                .iter()
                .map(|q| CartAction::Add(product("P", *q).with_variant(red())))
                .collect();
            let state = apply(&empty(), actions);
            prop_assert_eq!(state.items.len(), 1);
            prop_assert_eq!(state.items[0].quantity, quantities.iter().sum::<i64>());
        }
    }
}
