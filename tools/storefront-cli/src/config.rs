//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_codec::CodecConfig;
use storefront_commerce::config::CartConfig;
use storefront_commerce::location::{Country, LocationCatalog};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Local store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Cart engine settings.
    #[serde(default)]
    pub cart: CartConfig,

    /// Token settings.
    #[serde(default)]
    pub codec: CodecConfig,

    /// Shippable countries for `cart ship`.
    #[serde(default)]
    pub countries: Vec<Country>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(path, &content)
    }

    fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Country reference data as a lookup catalog.
    pub fn catalog(&self) -> LocationCatalog {
        LocationCatalog::new(self.countries.clone())
    }
}

/// Where the CLI keeps its cart and how it labels text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the persisted cart.
    #[serde(default = "default_store_dir")]
    pub dir: String,

    /// Locale used for names and variant labels.
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_store_dir() -> String {
    ".storefront".to_string()
}

fn default_locale() -> String {
    storefront_commerce::text::DEFAULT_LOCALE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            locale: default_locale(),
        }
    }
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storefront CLI configuration

[store]
dir = ".storefront"
locale = "en"

[cart]
tax_rate = 0.10
free_shipping_threshold = 50.0
flat_shipping_fee = 5.99
storage_key = "cart"
currency = "USD"

[codec]
secret = "storefront-buy-now"
compression_level = 3

[[countries]]
code = "US"
default_shipping_cost = 9.99

[[countries.states]]
code = "CA"
shipping_cost = 15.0

[[countries.states]]
code = "NY"
shipping_cost = 12.0

[[countries]]
code = "EG"
default_shipping_cost = 40.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_commerce::Money;

    #[test]
    fn test_default_config_parses() {
        let config = CliConfig::parse("storefront.toml", &generate_default_config()).unwrap();
        assert_eq!(config.store.dir, ".storefront");
        assert_eq!(config.cart.flat_shipping_fee, Money::new(599));
        assert_eq!(config.codec.compression_level, 3);

        let (country, state) = config.catalog().resolve("us", Some("ca")).unwrap();
        assert_eq!(country.default_shipping_cost, Money::new(999));
        assert_eq!(state.unwrap().shipping_cost, Money::new(1500));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::parse("storefront.toml", "").unwrap();
        assert_eq!(config.store.locale, "en");
        assert_eq!(config.cart, CartConfig::default());
        assert!(config.countries.is_empty());
    }

    #[test]
    fn test_json_config() {
        let config = CliConfig::parse(
            "storefront.json",
            r#"{"cart": {"tax_rate": 0.14}, "countries": [{"code": "SA", "defaultShippingCost": 25}]}"#,
        )
        .unwrap();
        assert!((config.cart.tax_rate - 0.14).abs() < f64::EPSILON);
        assert_eq!(config.countries[0].default_shipping_cost, Money::new(2500));
    }
}
