//! Ledger configuration loading from partstore.toml
//!
//! Every key is optional; a missing file means all defaults. `ALERT_EMAIL` in
//! the environment overrides the alert recipient so deployments can keep the
//! address in `.env`.

use crate::errors::{Error, Result};
use chrono::Duration;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default config file, overridable with `PARTSTORE_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "partstore.toml";

/// Configuration structure representing the entire partstore.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Stock ledger policy
    pub ledger: LedgerSettings,
    /// Low-stock alerting
    pub alerts: AlertSettings,
}

/// Policy knobs consumed by the ledger and the importer.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerSettings {
    /// Minimum quantity given to parts created without one
    pub min_qty_default: i64,
    /// Whether the first inbound scan at a location fixes the part there
    pub auto_assign_fixed_location: bool,
    /// Whether scanning an unknown location barcode creates it
    pub scan_creates_locations: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            min_qty_default: 0,
            auto_assign_fixed_location: true,
            scan_creates_locations: false,
        }
    }
}

/// Alert engine settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertSettings {
    /// Minimum minutes between two alerts for the same part
    pub throttle_minutes: u32,
    /// Who receives low-stock alerts
    pub recipient: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            throttle_minutes: 30,
            recipient: "stock-alerts@localhost".to_string(),
        }
    }
}

impl AlertSettings {
    /// The throttle window as a duration.
    #[must_use]
    pub fn throttle_window(&self) -> Duration {
        Duration::minutes(i64::from(self.throttle_minutes))
    }
}

impl AppConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse partstore.toml: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the ledger cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.min_qty_default < 0 {
            return Err(Error::Config {
                message: format!(
                    "ledger.min_qty_default must be >= 0, got {}",
                    self.ledger.min_qty_default
                ),
            });
        }
        if self.alerts.throttle_minutes == 0 {
            return Err(Error::Config {
                message: "alerts.throttle_minutes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults if it is absent.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {:?}; using defaults", path);
        return Ok(AppConfig::default());
    }
    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    AppConfig::from_toml(&contents)
}

/// Loads the application configuration and applies environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path =
        std::env::var("PARTSTORE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_config(&path)?;
    if let Ok(recipient) = std::env::var("ALERT_EMAIL") {
        if !recipient.trim().is_empty() {
            config.alerts.recipient = recipient;
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [ledger]
            min_qty_default = 2
            auto_assign_fixed_location = false
            scan_creates_locations = true

            [alerts]
            throttle_minutes = 5
            recipient = "stores@example.com"
        "#;

        let config = AppConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.ledger.min_qty_default, 2);
        assert!(!config.ledger.auto_assign_fixed_location);
        assert!(config.ledger.scan_creates_locations);
        assert_eq!(config.alerts.throttle_window(), Duration::minutes(5));
        assert_eq!(config.alerts.recipient, "stores@example.com");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = AppConfig::from_toml("[alerts]\nrecipient = \"a@b.c\"\n").unwrap();
        assert_eq!(config.ledger, LedgerSettings::default());
        assert!(config.ledger.auto_assign_fixed_location);
        assert_eq!(config.alerts.throttle_minutes, 30);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml("[ledger]\nmin_qty_default = -1\n"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml("[alerts]\nthrottle_minutes = 0\n"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config("does/not/exist/partstore.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
