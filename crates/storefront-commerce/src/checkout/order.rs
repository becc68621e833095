//! Order handoff types.
//!
//! The checkout service accepts cart rows translated into order lines. The
//! server re-validates price and stock before committing; nothing here is
//! authoritative.

use crate::cart::{CartLineItem, CartState, ItemType, PackageItem};
use crate::ids::{PackageId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One line of an order request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product or package.
    pub kind: ItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<PackageId>,
    pub quantity: i64,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Per-unit discount.
    pub unit_discount: Money,
    /// `(unit_price - unit_discount) * quantity`.
    pub line_total: Money,
    /// Variant labels such as "color: Red".
    #[serde(default)]
    pub variants: Vec<String>,
    /// Bundled products for package lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_items: Vec<PackageItem>,
}

impl OrderLine {
    /// Translate a cart row, labelling variants in `locale`.
    pub fn from_item(item: &CartLineItem, locale: &str) -> Self {
        Self {
            kind: item.item_type,
            product_id: item.product_id.clone(),
            package_id: item.package_id.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            unit_discount: item.discount.unwrap_or_default(),
            line_total: item.line_total(),
            variants: item
                .selected_variants
                .iter()
                .map(|v| v.label(locale))
                .collect(),
            package_items: item.package_items.clone(),
        }
    }
}

/// The request body handed to the checkout service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_cost: Money,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
}

impl OrderDraft {
    /// Build a draft from the current cart.
    ///
    /// Rows without any id cannot be ordered and are left out.
    pub fn from_state(state: &CartState, locale: &str) -> Self {
        let summary = &state.summary;
        Self {
            lines: state
                .items
                .iter()
                .filter(|item| item.product_id.is_some() || item.package_id.is_some())
                .map(|item| OrderLine::from_item(item, locale))
                .collect(),
            subtotal: summary.subtotal,
            discount: summary.discount,
            shipping_cost: summary.shipping_cost,
            total: summary.total,
            country_code: summary.selected_country.as_ref().map(|c| c.code.clone()),
            state_code: summary.selected_state.as_ref().map(|s| s.code.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
