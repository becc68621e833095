//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use storefront_cache::Cache;
use storefront_codec::{EnvelopeCodec, SealedCodec};
use storefront_commerce::cart::CartStore;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self { config, output, cwd })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        tracing::debug!(path = %config_path.display(), "loaded config");
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// The cart directory, `--store` taking precedence over config.
    pub fn store_dir(&self, store: Option<&str>) -> PathBuf {
        self.resolve_path(store.unwrap_or(&self.config.store.dir))
    }

    /// Open the persisted cart.
    pub fn open_cart(&self, store: Option<&str>) -> Result<CartStore> {
        let dir = self.store_dir(store);
        let cache = Cache::file(&dir)
            .with_context(|| format!("Failed to open cart store: {}", dir.display()))?;
        Ok(CartStore::open(cache, self.config.cart.clone()))
    }

    pub fn envelope_codec(&self) -> EnvelopeCodec {
        EnvelopeCodec::new()
    }

    pub fn sealed_codec(&self) -> SealedCodec {
        SealedCodec::from_config(&self.config.codec)
    }

    /// Locale for names and variant labels.
    pub fn locale(&self) -> &str {
        &self.config.store.locale
    }
}
