//! Cart engine configuration.

use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Tunables for summary computation and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Tax rate folded into the total (0.10 = 10%).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,

    /// Subtotals strictly above this ship free when no location is selected.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Money,

    /// Flat fee charged below the free-shipping threshold.
    #[serde(default = "default_flat_shipping_fee")]
    pub flat_shipping_fee: Money,

    /// Storage key holding the persisted cart.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Currency used for display.
    #[serde(default)]
    pub currency: Currency,
}

fn default_tax_rate() -> f64 {
    0.10
}

fn default_free_shipping_threshold() -> Money {
    Money::new(5000)
}

fn default_flat_shipping_fee() -> Money {
    Money::new(599)
}

fn default_storage_key() -> String {
    "cart".to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            free_shipping_threshold: default_free_shipping_threshold(),
            flat_shipping_fee: default_flat_shipping_fee(),
            storage_key: default_storage_key(),
            currency: Currency::default(),
        }
    }
}

impl CartConfig {
    /// Parse from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, CommerceError> {
        Ok(toml::from_str(content)?)
    }
}
