//! Configuration schema

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Counter defaults used when the command line does not set them
    #[serde(default)]
    pub counter: CounterConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Counter settings
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct CounterConfig {
    /// First counter value
    #[serde(default = "default_start")]
    pub start: i64,

    /// Step after each renamed file
    #[serde(default = "default_increment")]
    pub increment: i64,

    /// Zero-pad width (0 = number of arguments)
    #[serde(default = "default_width")]
    pub width: usize,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            increment: default_increment(),
            width: default_width(),
        }
    }
}

fn default_start() -> i64 {
    1
}

fn default_increment() -> i64 {
    1
}

fn default_width() -> usize {
    2
}
