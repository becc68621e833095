//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Settings for sealed tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Pre-shared passphrase for sealed tokens. Compiled into every client,
    /// so it is not a secret in any meaningful sense.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// zstd compression level.
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

fn default_secret() -> String {
    "storefront-buy-now".to_string()
}

fn default_compression_level() -> i32 {
    3
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            compression_level: default_compression_level(),
        }
    }
}
