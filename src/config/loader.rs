//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching aggregator.toml structure.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::application::{AggregatorConfig, FALLBACK_BASE_INDEX, FLAGSHIP_BASE_INDEX};
use crate::domain::Chain;

/// Main configuration structure matching aggregator.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub aggregator: AggregatorSection,
    #[serde(default)]
    pub telemetry: TelemetrySection,
    #[serde(default)]
    pub logging: LoggingSection,
    /// Providers in configured order; order decides the base provider
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

/// Aggregator configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSection {
    /// Network short name or alias ("ETH", "polygon", "BSC", ...)
    pub chain: Chain,
    /// Per-provider call timeout in seconds; 0 disables the bound
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    /// Skip failing providers during quote fan-out
    #[serde(default = "default_true")]
    pub isolate_quote_failures: bool,
    #[serde(default = "default_flagship_base_index")]
    pub flagship_base_index: usize,
    #[serde(default = "default_fallback_base_index")]
    pub fallback_base_index: usize,
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_flagship_base_index() -> usize {
    FLAGSHIP_BASE_INDEX
}

fn default_fallback_base_index() -> usize {
    FALLBACK_BASE_INDEX
}

/// Telemetry configuration section (optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelemetrySection {
    /// Post lifecycle events to a session trace collector
    #[serde(default)]
    pub enabled: bool,
    /// Collector base URL
    #[serde(default)]
    pub endpoint: String,
    /// Optional collector API key
    #[serde(default)]
    pub api_key: Option<String>,
}

impl TelemetrySection {
    /// Get API key with environment variable fallback
    /// Checks TELEMETRY_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("TELEMETRY_API_KEY").ok()
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// One `[[providers]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    /// Provider tag, must match the fixture's id
    pub id: String,
    /// JSON snapshot path (`~` is expanded)
    pub fixture: String,
}

impl ProviderEntry {
    pub fn fixture_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.fixture).as_ref())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregator.chain.name().is_empty() {
            return Err(ConfigError::ValidationError(
                "chain cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        if self.telemetry.enabled && self.telemetry.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "telemetry endpoint cannot be empty when telemetry is enabled".to_string(),
            ));
        }

        for (index, entry) in self.providers.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "provider {} has an empty id",
                    index
                )));
            }
            if entry.fixture.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "provider {} has an empty fixture path",
                    entry.id
                )));
            }
        }

        // Duplicate tags would shadow each other in dispatch
        for (index, entry) in self.providers.iter().enumerate() {
            if self.providers[..index].iter().any(|p| p.id == entry.id) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate provider id {}",
                    entry.id
                )));
            }
        }

        Ok(())
    }

    /// Fixture paths in configured order
    pub fn fixture_paths(&self) -> Vec<PathBuf> {
        self.providers.iter().map(ProviderEntry::fixture_path).collect()
    }
}

impl AggregatorSection {
    pub fn provider_timeout(&self) -> Option<Duration> {
        match self.provider_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

// Conversion from Config to AggregatorConfig
impl From<&Config> for AggregatorConfig {
    fn from(config: &Config) -> Self {
        let section = &config.aggregator;
        AggregatorConfig {
            chain: section.chain.clone(),
            provider_timeout: section.provider_timeout(),
            isolate_quote_failures: section.isolate_quote_failures,
            flagship_base_index: section.flagship_base_index,
            fallback_base_index: section.fallback_base_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[aggregator]
chain = "polygon"
provider_timeout_secs = 10
isolate_quote_failures = false

[telemetry]
enabled = true
endpoint = "http://localhost:4318/v1"

[logging]
level = "info"

[[providers]]
id = "oneInch"
fixture = "fixtures/oneinch.json"

[[providers]]
id = "paraswap"
fixture = "~/fixtures/paraswap.json"
"#
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.aggregator.chain, Chain::Polygon);
        assert_eq!(config.aggregator.provider_timeout(), Some(Duration::from_secs(10)));
        assert!(config.telemetry.enabled);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[1].id, "paraswap");
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let file = write_config("[aggregator]\nchain = \"ETH\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.aggregator.provider_timeout(), Some(Duration::from_secs(30)));
        assert!(config.aggregator.isolate_quote_failures);
        assert_eq!(config.aggregator.fallback_base_index, FALLBACK_BASE_INDEX);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.logging.level, "warn");
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/aggregator.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[aggregator\nchain = ");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_duplicate_provider_ids_rejected() {
        let content = r#"
[aggregator]
chain = "ETH"

[[providers]]
id = "zerox"
fixture = "a.json"

[[providers]]
id = "zerox"
fixture = "b.json"
"#;
        let file = write_config(content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_telemetry_requires_endpoint() {
        let content = "[aggregator]\nchain = \"BSC\"\n\n[telemetry]\nenabled = true\n";
        let file = write_config(content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_log_level() {
        let content = "[aggregator]\nchain = \"ETH\"\n\n[logging]\nlevel = \"loud\"\n";
        let file = write_config(content);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let content = "[aggregator]\nchain = \"ETH\"\nprovider_timeout_secs = 0\n";
        let file = write_config(content);
        let config = load_config(file.path()).unwrap();

        let aggregator = AggregatorConfig::from(&config);
        assert_eq!(aggregator.provider_timeout, None);
        assert_eq!(aggregator.base_index(), FLAGSHIP_BASE_INDEX);
    }

    #[test]
    fn test_fixture_path_expands_home() {
        let entry = ProviderEntry {
            id: "paraswap".to_string(),
            fixture: "~/fixtures/paraswap.json".to_string(),
        };
        assert!(entry.fixture_path().ends_with("fixtures/paraswap.json"));

        let relative = ProviderEntry {
            id: "zerox".to_string(),
            fixture: "fixtures/zerox.json".to_string(),
        };
        assert_eq!(relative.fixture_path(), PathBuf::from("fixtures/zerox.json"));
    }

    #[test]
    fn test_api_key_prefers_config_value() {
        let section = TelemetrySection {
            enabled: true,
            endpoint: "http://collector".to_string(),
            api_key: Some("from-config".to_string()),
        };
        assert_eq!(section.get_api_key().as_deref(), Some("from-config"));
    }
}
