//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    AggregatorSection, Config, ConfigError, LoggingSection, ProviderEntry, TelemetrySection,
    load_config,
};
