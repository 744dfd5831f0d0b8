//! Application settings loading from config.toml
//!
//! The file is optional. It can override the database location, control whether
//! the daily delivery run happens at startup, and list the vendors and products
//! seeded into an empty marketplace.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming an alternative settings file
pub const CONFIG_PATH_ENV: &str = "MILKMAN_CONFIG";

/// Settings file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Database URL, overridden by `DATABASE_URL`
    #[serde(default)]
    pub database_url: Option<String>,
    /// Delivery run behaviour
    #[serde(default)]
    pub delivery: DeliverySettings,
    /// Vendors (with their products) to seed
    #[serde(default)]
    pub vendors: Vec<VendorSeed>,
}

/// Daily delivery run settings
#[derive(Debug, Deserialize)]
pub struct DeliverySettings {
    /// Process today's subscription deliveries when the binary starts
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            run_on_startup: default_run_on_startup(),
        }
    }
}

const fn default_run_on_startup() -> bool {
    true
}

/// A vendor to seed, identified by name
#[derive(Debug, Deserialize, Clone)]
pub struct VendorSeed {
    /// Shop name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Shop address
    #[serde(default)]
    pub address: Option<String>,
    /// Products sold by this vendor
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// A product to seed under its vendor
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Product name
    pub name: String,
    /// Unit description, e.g. "1 L"
    pub unit: String,
    /// Price per unit
    pub price: f64,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
///
/// # Errors
/// Returns an error if the TOML is invalid or required fields are missing.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `MILKMAN_CONFIG` or `./config.toml`.
///
/// A missing file is not an error: defaults are returned and a warning is logged.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::warn!("No settings file at {}, using defaults", path);
        return Ok(Settings::default());
    }
    load_settings(&path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            database_url = "sqlite::memory:"

            [delivery]
            run_on_startup = false

            [[vendors]]
            name = "Green Valley Dairy"
            phone = "555-0100"

            [[vendors.products]]
            name = "Cow Milk"
            unit = "1 L"
            price = 1.2

            [[vendors.products]]
            name = "Paneer"
            unit = "200 g"
            price = 2.5

            [[vendors]]
            name = "Hilltop Farm"
            phone = "555-0199"
            address = "12 Ridge Road"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.database_url.as_deref(), Some("sqlite::memory:"));
        assert!(!settings.delivery.run_on_startup);
        assert_eq!(settings.vendors.len(), 2);
        assert_eq!(settings.vendors[0].products.len(), 2);
        assert_eq!(settings.vendors[0].products[1].price, 2.5);
        assert!(settings.vendors[1].products.is_empty());
        assert_eq!(settings.vendors[1].address.as_deref(), Some("12 Ridge Road"));
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = parse_settings("").unwrap();
        assert!(settings.database_url.is_none());
        assert!(settings.delivery.run_on_startup);
        assert!(settings.vendors.is_empty());
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        let result = parse_settings("[[vendors]]\nname = 3");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_example_config_parses() {
        let settings = parse_settings(include_str!("../../config.example.toml")).unwrap();
        assert!(settings.delivery.run_on_startup);
        assert_eq!(settings.vendors.len(), 1);
        assert_eq!(settings.vendors[0].products.len(), 2);
    }
}
