//! Configuration Module
//!
//! Handles loading registry configuration from environment variables.

use std::env;

/// Registry configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Run the setup callback when `set` creates a brand new entry.
    ///
    /// When disabled, `set` publishes the given value directly and setup
    /// never runs for that (type, carrier) pair.
    pub init_on_set: bool,
    /// Background sweep task interval in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_INIT_ON_SET` - Run setup on `set` for new entries (default: true)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            init_on_set: env::var("CACHE_INIT_ON_SET")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.init_on_set),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            init_on_set: true,
            sweep_interval: 30,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
