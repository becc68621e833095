//! Cart line items and slot identity.

use crate::ids::{PackageId, ProductId};
use crate::money::Money;
use crate::text::{variants_contain, variants_equal, LocalizedText, SelectedVariant};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator between single products and bundled packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemType {
    #[default]
    Product,
    Package,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Product => "product",
            ItemType::Package => "package",
        }
    }
}

/// A product bundled inside a package row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageItem {
    pub product_id: ProductId,
    #[serde(default = "one", deserialize_with = "coerce_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub selected_variants: Vec<SelectedVariant>,
}

fn one() -> i64 {
    1
}

/// One row of the cart.
///
/// Product rows carry `product_id`; package rows carry `package_id` and
/// `package_items`. Both ids are optional on the wire because rows written
/// by older clients may lack them; such rows can only be removed by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(default)]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<PackageId>,
    #[serde(default, deserialize_with = "coerce_quantity")]
    pub quantity: i64,
    /// Unit price.
    pub price: Money,
    /// Per-unit discount subtracted from `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub product_name: LocalizedText,
    #[serde(default)]
    pub selected_variants: Vec<SelectedVariant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_items: Vec<PackageItem>,
}

impl CartLineItem {
    /// A product row.
    pub fn product(
        product_id: impl Into<ProductId>,
        product_name: LocalizedText,
        quantity: i64,
        price: Money,
    ) -> Self {
        Self {
            item_type: ItemType::Product,
            product_id: Some(product_id.into()),
            package_id: None,
            quantity,
            price,
            discount: None,
            image: String::new(),
            product_name,
            selected_variants: Vec::new(),
            package_items: Vec::new(),
        }
    }

    /// A package row.
    pub fn package(
        package_id: impl Into<PackageId>,
        product_name: LocalizedText,
        quantity: i64,
        price: Money,
        package_items: Vec<PackageItem>,
    ) -> Self {
        Self {
            item_type: ItemType::Package,
            product_id: None,
            package_id: Some(package_id.into()),
            quantity,
            price,
            discount: None,
            image: String::new(),
            product_name,
            selected_variants: Vec::new(),
            package_items,
        }
    }

    pub fn with_variant(mut self, variant: SelectedVariant) -> Self {
        self.selected_variants.push(variant);
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Unit price after the per-unit discount.
    pub fn unit_net_price(&self) -> Money {
        self.price - self.discount.unwrap_or_default()
    }

    /// `(price - discount) * quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_net_price() * self.quantity
    }

    /// The item type implied by which id the row carries.
    pub fn inferred_type(&self) -> ItemType {
        if self.package_id.is_some() {
            ItemType::Package
        } else {
            ItemType::Product
        }
    }

    /// Whether two rows occupy the same slot.
    ///
    /// Same `package_id`, or same `product_id` with set-equal variants.
    pub fn same_slot(&self, other: &CartLineItem) -> bool {
        if let (Some(a), Some(b)) = (&self.package_id, &other.package_id) {
            if a == b {
                return true;
            }
        }
        match (&self.product_id, &other.product_id) {
            (Some(a), Some(b)) => {
                a == b && variants_equal(&self.selected_variants, &other.selected_variants)
            }
            _ => false,
        }
    }
}

/// Addresses a cart slot for quantity updates and removal.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotKey {
    /// A package row, matched on id alone.
    Package(PackageId),
    /// A product row with a variant selection.
    Product {
        product_id: ProductId,
        variants: Vec<SelectedVariant>,
    },
}

impl SlotKey {
    pub fn package(id: impl Into<PackageId>) -> Self {
        SlotKey::Package(id.into())
    }

    pub fn product(id: impl Into<ProductId>, variants: Vec<SelectedVariant>) -> Self {
        SlotKey::Product {
            product_id: id.into(),
            variants,
        }
    }

    /// Build a key from optional caller arguments.
    ///
    /// A package id wins when both are given. Returns `None` when neither id
    /// is present.
    pub fn from_parts(
        product_id: Option<ProductId>,
        package_id: Option<PackageId>,
        variants: Vec<SelectedVariant>,
    ) -> Option<Self> {
        match (package_id, product_id) {
            (Some(package_id), _) => Some(SlotKey::Package(package_id)),
            (None, Some(product_id)) => Some(SlotKey::Product {
                product_id,
                variants,
            }),
            (None, None) => None,
        }
    }

    /// Slot lookup used by add and quantity updates: variant sets must be
    /// equal in both directions.
    pub fn identifies(&self, row: &CartLineItem) -> bool {
        match self {
            SlotKey::Package(id) => row.package_id.as_ref() == Some(id),
            SlotKey::Product {
                product_id,
                variants,
            } => {
                row.product_id.as_ref() == Some(product_id)
                    && variants_equal(&row.selected_variants, variants)
            }
        }
    }

    /// Row selection used by removal: the key's variants only need to be a
    /// subset of the row's.
    ///
    /// This is looser than [`SlotKey::identifies`], so removing
    /// `{color: red}` also drops a `{color: red, size: M}` row that an add
    /// of `{color: red}` would not have merged into.
    pub fn selects(&self, row: &CartLineItem) -> bool {
        match self {
            SlotKey::Package(id) => row.package_id.as_ref() == Some(id),
            SlotKey::Product {
                product_id,
                variants,
            } => {
                row.product_id.as_ref() == Some(product_id)
                    && variants_contain(&row.selected_variants, variants)
            }
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Package(id) => write!(f, "package:{}", id),
            SlotKey::Product {
                product_id,
                variants,
            } => write!(f, "product:{} ({} variants)", product_id, variants.len()),
        }
    }
}

/// Reads a quantity from a number or numeric string.
///
/// Anything unusable becomes 0, which the loader then drops.
fn coerce_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(QuantityVisitor)
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a quantity")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        Ok(i64::try_from(v).unwrap_or(0))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        Ok(if v.is_finite() { v.trunc() as i64 } else { 0 })
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        Ok(v.trim().parse::<f64>().map_or(0, |n| {
            if n.is_finite() {
                n.trunc() as i64
            } else {
                0
            }
        }))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<i64, E> {
        Ok(0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> SelectedVariant {
        SelectedVariant::new("color", LocalizedText::new("en", "Red"))
    }

    fn medium() -> SelectedVariant {
        SelectedVariant::new("size", LocalizedText::new("en", "M"))
    }

    fn shirt() -> CartLineItem {
        CartLineItem::product("P", LocalizedText::new("en", "Shirt"), 1, Money::new(2000))
    }

    #[test]
    fn test_line_total_subtracts_unit_discount() {
        let item = shirt().with_discount(Money::new(250));
        let item = CartLineItem { quantity: 3, ..item };
        assert_eq!(item.line_total(), Money::new(5250));
    }

    #[test]
    fn test_same_slot_product() {
        let a = shirt().with_variant(red()).with_variant(medium());
        let b = shirt().with_variant(medium()).with_variant(red());
        let c = shirt().with_variant(red());
        assert!(a.same_slot(&b));
        assert!(!a.same_slot(&c));
    }

    #[test]
    fn test_same_slot_package_ignores_variants() {
        let a = CartLineItem::package("K", LocalizedText::default(), 1, Money::new(100), vec![]);
        let b = a.clone().with_variant(red());
        assert!(a.same_slot(&b));
    }

    #[test]
    fn test_rows_without_ids_never_match() {
        let mut legacy = shirt();
        legacy.product_id = None;
        assert!(!legacy.same_slot(&legacy.clone()));
    }

    #[test]
    fn test_slot_key_identifies_vs_selects() {
        let row = shirt().with_variant(red()).with_variant(medium());
        let key = SlotKey::product("P", vec![red()]);
        assert!(key.selects(&row));
        assert!(!key.identifies(&row));
    }

    #[test]
    fn test_from_parts_prefers_package() {
        let key = SlotKey::from_parts(Some("P".into()), Some("K".into()), vec![red()]);
        assert_eq!(key, Some(SlotKey::package("K")));
        assert_eq!(SlotKey::from_parts(None, None, vec![]), None);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(shirt().with_variant(red())).unwrap();
        assert_eq!(json["itemType"], "Product");
        assert_eq!(json["productId"], "P");
        assert_eq!(json["selectedVariants"][0]["value"]["en"], "Red");
        assert!(json.get("packageId").is_none());
    }

    #[test]
    fn test_quantity_coercion() {
        let row: CartLineItem =
            serde_json::from_str(r#"{"productId":"P","quantity":"3","price":10}"#).unwrap();
        assert_eq!(row.quantity, 3);
        assert_eq!(row.item_type, ItemType::Product);

        let row: CartLineItem =
            serde_json::from_str(r#"{"productId":"P","quantity":"lots","price":10}"#).unwrap();
        assert_eq!(row.quantity, 0);

        let row: CartLineItem =
            serde_json::from_str(r#"{"productId":"P","quantity":2.9,"price":10}"#).unwrap();
        assert_eq!(row.quantity, 2);
    }
}
