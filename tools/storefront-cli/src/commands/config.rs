//! Configuration management commands.

use std::collections::HashSet;
use std::fs;

use anyhow::{bail, Result};
use storefront_commerce::Money;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    let config = &ctx.config;
    let currency = config.cart.currency;

    ctx.output.info("[store]");
    ctx.output.kv("dir", &config.store.dir);
    ctx.output.kv("locale", &config.store.locale);

    ctx.output.info("[cart]");
    ctx.output.kv("tax_rate", &config.cart.tax_rate.to_string());
    ctx.output.kv(
        "free_shipping_threshold",
        &config.cart.free_shipping_threshold.display(currency),
    );
    ctx.output.kv(
        "flat_shipping_fee",
        &config.cart.flat_shipping_fee.display(currency),
    );
    ctx.output.kv("storage_key", &config.cart.storage_key);
    ctx.output.kv("currency", currency.code());

    ctx.output.info("[codec]");
    ctx.output.kv("compression_level", &config.codec.compression_level.to_string());

    if !config.countries.is_empty() {
        ctx.output.info("Countries:");
        for country in &config.countries {
            let states: Vec<&str> = country.states.iter().map(|s| s.code.as_str()).collect();
            let line = if states.is_empty() {
                format!(
                    "{} ({})",
                    country.code,
                    country.default_shipping_cost.display(currency)
                )
            } else {
                format!(
                    "{} ({}) states: {}",
                    country.code,
                    country.default_shipping_cost.display(currency),
                    states.join(", ")
                )
            };
            ctx.output.list_item(&line);
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check_config(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Returns `(errors, warnings)`.
fn check_config(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if !(0.0..1.0).contains(&config.cart.tax_rate) {
        errors.push(format!(
            "cart.tax_rate {} must be in [0, 1)",
            config.cart.tax_rate
        ));
    }

    if config.cart.flat_shipping_fee < Money::zero() {
        errors.push("cart.flat_shipping_fee must not be negative".to_string());
    }

    if config.cart.storage_key.trim().is_empty() {
        errors.push("cart.storage_key is required".to_string());
    }

    if !(1..=22).contains(&config.codec.compression_level) {
        warnings.push(format!(
            "codec.compression_level {} is outside zstd's 1-22 range",
            config.codec.compression_level
        ));
    }

    let mut seen = HashSet::new();
    for (i, country) in config.countries.iter().enumerate() {
        if !seen.insert(country.code.to_ascii_uppercase()) {
            errors.push(format!("countries[{}].code '{}' is duplicated", i, country.code));
        }
        if country.default_shipping_cost < Money::zero() {
            errors.push(format!("countries[{}] has a negative shipping cost", i));
        }
        for state in &country.states {
            if state.shipping_cost < Money::zero() {
                errors.push(format!(
                    "{}/{} has a negative shipping cost",
                    country.code, state.code
                ));
            }
        }
    }

    if config.countries.is_empty() {
        warnings.push("no countries configured; `cart ship` will reject every code".to_string());
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_commerce::location::Country;

    #[test]
    fn test_check_default_config() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        let (errors, warnings) = check_config(&config);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_check_catches_bad_values() {
        let mut config = CliConfig::default();
        config.cart.tax_rate = 1.5;
        config.countries = vec![
            Country::new("US", Money::new(100)),
            Country::new("us", Money::new(-1)),
        ];

        let (errors, _) = check_config(&config);
        assert_eq!(errors.len(), 3, "{errors:?}");
    }
}
