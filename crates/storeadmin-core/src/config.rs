//! Admin configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use storeadmin_catalog::Currency;

use crate::error::{AdminError, Result};
use crate::permissions::PermissionPolicy;

/// Settings shared by all admin operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Store currency.
    #[serde(default)]
    pub currency: Currency,

    /// Defaults for generated attribute combinations.
    #[serde(default)]
    pub combinations: CombinationDefaults,

    /// Export/print batch settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Tax settings used for bundle item prices.
    #[serde(default)]
    pub tax: TaxConfig,

    /// Operation permission overrides.
    #[serde(default)]
    pub permissions: PermissionPolicy,
}

impl AdminConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AdminError::Config(e.to_string()))
    }

    /// Load config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdminError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Values written into combinations created by "create all".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationDefaults {
    #[serde(default = "default_stock_quantity")]
    pub stock_quantity: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub allow_out_of_stock_orders: bool,
}

fn default_stock_quantity() -> i64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for CombinationDefaults {
    fn default() -> Self {
        Self {
            stock_quantity: default_stock_quantity(),
            is_active: true,
            allow_out_of_stock_orders: true,
        }
    }
}

/// Batch limits for export and print operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_max_items() -> usize {
    500
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
        }
    }
}

/// Flat-rate tax settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Tax rate in percent.
    #[serde(default)]
    pub rate_percent: f64,
    /// Whether catalog prices are entered including tax.
    #[serde(default)]
    pub prices_include_tax: bool,
    /// Whether prices are shown to customers including tax.
    #[serde(default = "default_true")]
    pub display_prices_with_tax: bool,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            rate_percent: 0.0,
            prices_include_tax: false,
            display_prices_with_tax: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.combinations.stock_quantity, 10_000);
        assert!(config.combinations.is_active);
        assert!(config.combinations.allow_out_of_stock_orders);
        assert_eq!(config.batch.max_items, 500);
        assert_eq!(config.currency, Currency::USD);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AdminConfig::from_toml_str(
            r#"
            currency = "EUR"

            [tax]
            rate_percent = 19.0

            [batch]
            max_items = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.currency, Currency::EUR);
        assert_eq!(config.batch.max_items, 250);
        assert!((config.tax.rate_percent - 19.0).abs() < f64::EPSILON);
        assert!(config.tax.display_prices_with_tax);
        assert_eq!(config.combinations.stock_quantity, 10_000);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AdminConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AdminConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            AdminConfig::from_toml_str("batch = 3"),
            Err(AdminError::Config(_))
        ));
    }
}
