//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storeadmin_core::config::AdminConfig;
use storeadmin_core::permissions::{Principal, Role};

/// Default catalog snapshot file name.
pub const DEFAULT_CATALOG: &str = "catalog.json";

/// CLI configuration file (`storeadmin.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Catalog snapshot path, relative to the working directory.
    #[serde(default)]
    pub catalog: Option<String>,

    /// Who the CLI acts as.
    #[serde(default)]
    pub principal: PrincipalConfig,

    /// Admin operation settings.
    #[serde(default)]
    pub admin: AdminConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    pub fn catalog_path(&self) -> &str {
        self.catalog.as_deref().unwrap_or(DEFAULT_CATALOG)
    }
}

/// Principal the CLI runs admin operations as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalConfig {
    #[serde(default = "default_principal_name")]
    pub name: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<Role>,
}

fn default_principal_name() -> String {
    std::env::var("USER").unwrap_or_else(|_| "admin".to_string())
}

fn default_roles() -> Vec<Role> {
    vec![Role::Admin]
}

impl Default for PrincipalConfig {
    fn default() -> Self {
        Self {
            name: default_principal_name(),
            roles: default_roles(),
        }
    }
}

impl PrincipalConfig {
    pub fn principal(&self) -> Principal {
        Principal::new(self.name.clone(), self.roles.clone())
    }
}

/// Generate a default storeadmin.toml config file.
pub fn generate_default_config(principal: &str) -> String {
    format!(
        r#"# StoreAdmin configuration

catalog = "{catalog}"

[principal]
name = "{principal}"
roles = ["admin"]

[admin]
currency = "USD"

[admin.combinations]
stock_quantity = 10000
is_active = true
allow_out_of_stock_orders = true

[admin.batch]
# 0 disables the limit
max_items = 500

[admin.tax]
rate_percent = 0.0
prices_include_tax = false
display_prices_with_tax = true

[admin.permissions.overrides]
# delete_all_combinations = "manage_settings"
"#,
        catalog = DEFAULT_CATALOG,
        principal = principal
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config("ops")).unwrap();
        assert_eq!(config.principal.name, "ops");
        assert_eq!(config.principal.roles, vec![Role::Admin]);
        assert_eq!(config.catalog_path(), DEFAULT_CATALOG);
        assert_eq!(config.admin.batch.max_items, 500);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.catalog_path(), "catalog.json");
        assert_eq!(config.admin.combinations.stock_quantity, 10_000);
    }
}
