//! # Terminal Configuration
//!
//! Environment-driven settings with logged fallbacks. A terminal in the
//! dining room has nobody watching its console, so misconfiguration is
//! surfaced loudly at startup and every fallback is recorded.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    /// Seconds between scheduled order refreshes.
    pub poll_interval_secs: u64,
    /// Where the device keeps its table assignment and UI preferences.
    pub device_state_path: String,
    /// Capacity of each store's request channel.
    pub store_buffer: usize,
}

impl Config {
    pub fn load() -> Self {
        Self {
            poll_interval_secs: try_load("TABLESIDE_POLL_INTERVAL_SECS", "30"),
            device_state_path: try_load("TABLESIDE_DEVICE_STATE", "device-state.json"),
            store_buffer: try_load("TABLESIDE_STORE_BUFFER", "32"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
