//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod token;

use std::io::Read;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use storefront_codec::PayloadType;

/// Arguments for the token command.
#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Wrap a JSON payload in an envelope token.
    Encode {
        /// Payload type recorded in the envelope.
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// JSON payload, `@file`, or `-` for stdin.
        payload: String,
    },
    /// Decode an envelope token.
    Decode {
        /// Envelope token.
        token: String,
    },
    /// Check an envelope token is complete and fresh.
    Validate {
        /// Envelope token.
        token: String,

        /// Reject envelopes older than this many milliseconds.
        #[arg(long)]
        max_age_ms: Option<i64>,
    },
    /// Compress and encrypt a JSON payload.
    Seal {
        /// JSON payload, `@file`, or `-` for stdin.
        payload: String,
    },
    /// Decrypt a sealed token.
    Open {
        /// Sealed token.
        token: String,
    },
    /// Compress a JSON payload without encryption.
    Compress {
        /// JSON payload, `@file`, or `-` for stdin.
        payload: String,
    },
    /// Decode a compressed token.
    Decompress {
        /// Compressed token.
        token: String,
    },
    /// Decode every known deep-link parameter in a URL or query string.
    Inspect {
        /// URL or query string.
        link: String,
    },
}

/// Envelope payload types.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Product,
    Package,
    Items,
    Cart,
}

impl From<KindArg> for PayloadType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Product => PayloadType::Product,
            KindArg::Package => PayloadType::Package,
            KindArg::Items => PayloadType::Items,
            KindArg::Cart => PayloadType::Cart,
        }
    }
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    /// Cart directory (default: `store.dir` from config).
    #[arg(long, global = true)]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: CartCommand,
}

/// Identifies a cart slot on the command line.
#[derive(Args, Clone)]
pub struct SlotArgs {
    /// Product id.
    #[arg(long, conflicts_with = "package")]
    pub product: Option<String>,

    /// Package id.
    #[arg(long)]
    pub package: Option<String>,

    /// Variant selection as `name=value`; value may be a JSON locale map.
    #[arg(long = "variant", value_name = "NAME=VALUE")]
    pub variants: Vec<String>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show items and summary.
    Show,
    /// Add a line item given as JSON.
    Add {
        /// Line item JSON, `@file`, or `-` for stdin.
        item: String,
    },
    /// Remove rows by slot or by position.
    Remove {
        #[command(flatten)]
        slot: SlotArgs,

        /// Row position as shown by `cart show`.
        #[arg(long, conflicts_with_all = ["product", "package"])]
        index: Option<usize>,
    },
    /// Replace the quantity of a slot; below 1 removes it.
    SetQty {
        #[command(flatten)]
        slot: SlotArgs,

        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every row.
    Clear,
    /// Price the cart for a shipping destination from the configured countries.
    ///
    /// The destination applies to the summary printed by this command only.
    /// It is not saved; the next command prices the cart without one.
    Ship {
        /// Country code.
        country: String,

        /// State code.
        state: Option<String>,
    },
    /// Add the items carried by a deep link.
    Import {
        /// URL or query string.
        link: String,
    },
    /// Print the order request for the current cart.
    Checkout,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

/// Read a payload argument: literal text, `@path`, or `-` for stdin.
pub fn read_input(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    } else {
        Ok(arg.to_string())
    }
}

/// Parse a JSON payload argument.
pub fn read_json<T: serde::de::DeserializeOwned>(arg: &str) -> Result<T> {
    let text = read_input(arg)?;
    serde_json::from_str(text.trim()).context("Payload is not valid JSON")
}

/// The query part of a URL, or the input unchanged.
pub fn query_part(link: &str) -> &str {
    let link = link.trim();
    let query = match link.split_once('?') {
        Some((_, query)) => query,
        None => link,
    };
    query.split('#').next().unwrap_or(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_part() {
        assert_eq!(query_part("https://shop.test/p/1?product=abc&x=1#top"), "product=abc&x=1");
        assert_eq!(query_part("?cart=xyz"), "cart=xyz");
        assert_eq!(query_part("items=1"), "items=1");
    }

    #[test]
    fn test_ship_help_says_location_is_not_saved() {
        let cart = CartCommand::augment_subcommands(clap::Command::new("cart"));
        let ship = cart.find_subcommand("ship").unwrap();
        let help = ship.get_long_about().unwrap().to_string();
        assert!(help.contains("It is not saved"), "{help}");
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("item.json");
        std::fs::write(&path, r#"{"productId": "P"}"#).unwrap();

        let arg = format!("@{}", path.display());
        let value: serde_json::Value = read_json(&arg).unwrap();
        assert_eq!(value["productId"], "P");
        assert_eq!(read_input("literal").unwrap(), "literal");
    }
}
