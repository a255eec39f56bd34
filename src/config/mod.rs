//! Configuration management

mod schema;

pub use schema::{Config, CounterConfig, GeneralConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from a file or default location.
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = path.map(PathBuf::from).or_else(Self::default_path) else {
            return Ok(Self::default());
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the default config file path
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("namely").join("config.toml"))
    }
}
