//! Cart summary computation.

use crate::cart::CartLineItem;
use crate::config::CartConfig;
use crate::location::{Country, State};
use crate::money::{round_half_up, Money};
use serde::{Deserialize, Serialize};

/// Derived price summary. Recomputed after every mutation and never trusted
/// from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Money,
    /// Cart-level discount. Per-item discounts are already in `subtotal`.
    pub discount: Money,
    pub shipping_cost: Money,
    pub items_count: i64,
    /// `subtotal + tax + shipping_cost - discount`. Tax is folded in here and
    /// has no field of its own.
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_country: Option<Country>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_state: Option<State>,
}

impl CartSummary {
    /// Compute the summary for `items` shipped to the given location.
    pub fn compute(
        items: &[CartLineItem],
        country: Option<&Country>,
        state: Option<&State>,
        config: &CartConfig,
    ) -> Self {
        let subtotal: Money = items.iter().map(CartLineItem::line_total).sum();
        let shipping_cost = shipping_cost(subtotal, country, state, config);
        let discount = Money::zero();

        // Tax stays fractional until the single rounding of the total.
        let tax = subtotal.amount_cents as f64 * config.tax_rate;
        let total = Money::new(round_half_up(
            subtotal.amount_cents as f64 + tax + shipping_cost.amount_cents as f64
                - discount.amount_cents as f64,
        ));

        Self {
            subtotal,
            discount,
            shipping_cost,
            items_count: items
                .iter()
                .fold(0i64, |count, i| count.saturating_add(i.quantity)),
            total,
            selected_country: country.cloned(),
            selected_state: state.cloned(),
        }
    }

    /// Summary of an empty cart with no location selected.
    pub fn empty(config: &CartConfig) -> Self {
        Self::compute(&[], None, None, config)
    }

    /// The tax folded into `total`, recovered from the other fields.
    pub fn implied_tax(&self) -> Money {
        self.total - self.subtotal - self.shipping_cost + self.discount
    }
}

/// State rate, else country default, else the free-shipping threshold rule.
pub fn shipping_cost(
    subtotal: Money,
    country: Option<&Country>,
    state: Option<&State>,
    config: &CartConfig,
) -> Money {
    match (state, country) {
        (Some(state), _) => state.shipping_cost,
        (None, Some(country)) => country.default_shipping_cost,
        (None, None) if subtotal > config.free_shipping_threshold => Money::zero(),
        (None, None) => config.flat_shipping_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::LocalizedText;

    fn item(id: &str, quantity: i64, cents: i64) -> CartLineItem {
        CartLineItem::product(id, LocalizedText::new("en", id), quantity, Money::new(cents))
    }

    #[test]
    fn test_items_count_saturates() {
        let config = CartConfig::default();
        let items = [item("A", i64::MAX, 1), item("B", 1, 1)];
        let summary = CartSummary::compute(&items, None, None, &config);
        assert_eq!(summary.items_count, i64::MAX);
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let config = CartConfig::default();
        let summary = CartSummary::compute(&[item("A", 1, 5100)], None, None, &config);
        assert_eq!(summary.shipping_cost, Money::zero());
        assert_eq!(summary.total, Money::new(5610));
    }

    #[test]
    fn test_flat_fee_below_threshold() {
        let config = CartConfig::default();
        let summary = CartSummary::compute(&[item("A", 1, 4900)], None, None, &config);
        assert_eq!(summary.shipping_cost, Money::new(599));
        // 49.00 + 4.90 tax + 5.99
        assert_eq!(summary.total, Money::new(5989));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let config = CartConfig::default();
        let summary = CartSummary::compute(&[item("A", 1, 5000)], None, None, &config);
        assert_eq!(summary.shipping_cost, Money::new(599));
    }

    #[test]
    fn test_state_rate_overrides_subtotal() {
        let config = CartConfig::default();
        let country = Country::new("US", Money::new(999));
        let state = State::new("CA", Money::new(1500));

        for cents in [100, 5100, 100_000] {
            let summary =
                CartSummary::compute(&[item("A", 1, cents)], Some(&country), Some(&state), &config);
            assert_eq!(summary.shipping_cost, Money::new(1500));
        }

        let summary = CartSummary::compute(&[item("A", 1, 100)], Some(&country), None, &config);
        assert_eq!(summary.shipping_cost, Money::new(999));
    }

    #[test]
    fn test_subtotal_and_count() {
        let config = CartConfig::default();
        let items = vec![
            item("A", 2, 1000).with_discount(Money::new(100)),
            item("B", 3, 333),
        ];
        let summary = CartSummary::compute(&items, None, None, &config);
        assert_eq!(summary.subtotal, Money::new(2799));
        assert_eq!(summary.items_count, 5);
        assert_eq!(summary.discount, Money::zero());
        // 27.99 + 2.799 tax + 5.99 = 36.779 -> 36.78
        assert_eq!(summary.total, Money::new(3678));
        assert_eq!(summary.implied_tax(), Money::new(280));
    }

    #[test]
    fn test_compute_is_deterministic() {
        let config = CartConfig::default();
        let items = vec![item("A", 2, 1234), item("B", 1, 99)];
        let country = Country::new("EG", Money::new(4000));
        let first = CartSummary::compute(&items, Some(&country), None, &config);
        let second = CartSummary::compute(&items, Some(&country), None, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_has_no_tax_field() {
        let json = serde_json::to_value(CartSummary::empty(&CartConfig::default())).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["discount", "itemsCount", "shippingCost", "subtotal", "total"]
        );
    }
}
