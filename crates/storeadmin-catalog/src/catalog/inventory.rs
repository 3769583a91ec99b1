//! Inventory settings edited on the product inventory tab.

use crate::CatalogError;
use serde::{Deserialize, Serialize};

/// How stock is tracked for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ManageInventoryMethod {
    /// No stock tracking.
    #[default]
    DontManage,
    /// Track one stock quantity for the product.
    ManageStock,
    /// Track stock per attribute combination.
    ManageStockByAttributes,
}

/// What happens when stock runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BackorderMode {
    #[default]
    NoBackorders,
    AllowQtyBelowZero,
    AllowQtyBelowZeroAndNotify,
}

/// Inventory settings for a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventorySettings {
    pub method: ManageInventoryMethod,
    pub stock_quantity: i64,
    pub display_stock_availability: bool,
    pub min_stock_quantity: i64,
    /// Notify the admin when stock drops below this quantity.
    pub notify_admin_below: Option<i64>,
    pub backorder_mode: BackorderMode,
    pub order_minimum_quantity: u32,
    pub order_maximum_quantity: u32,
    /// Fixed quantities a customer may choose from; empty means any.
    pub allowed_quantities: Vec<u32>,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            method: ManageInventoryMethod::DontManage,
            stock_quantity: 0,
            display_stock_availability: false,
            min_stock_quantity: 0,
            notify_admin_below: None,
            backorder_mode: BackorderMode::NoBackorders,
            order_minimum_quantity: 1,
            order_maximum_quantity: 10_000,
            allowed_quantities: Vec::new(),
        }
    }
}

impl InventorySettings {
    /// Whether stock is tracked per attribute combination.
    pub fn tracks_combinations(&self) -> bool {
        self.method == ManageInventoryMethod::ManageStockByAttributes
    }

    /// Check the cart quantity bounds.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.order_minimum_quantity == 0 {
            return Err(CatalogError::InvalidInventory(
                "order minimum quantity must be at least 1".to_string(),
            ));
        }
        if self.order_minimum_quantity > self.order_maximum_quantity {
            return Err(CatalogError::InvalidInventory(format!(
                "order minimum quantity {} exceeds maximum {}",
                self.order_minimum_quantity, self.order_maximum_quantity
            )));
        }
        if self.allowed_quantities.iter().any(|q| *q == 0) {
            return Err(CatalogError::InvalidInventory(
                "allowed quantities must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(InventorySettings::default().validate().is_ok());
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let settings = InventorySettings {
            order_minimum_quantity: 20,
            order_maximum_quantity: 10,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CatalogError::InvalidInventory(_))
        ));
    }

    #[test]
    fn test_zero_allowed_quantity_is_rejected() {
        let settings = InventorySettings {
            allowed_quantities: vec![1, 0, 12],
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_tracks_combinations_only_by_attributes() {
        let mut settings = InventorySettings::default();
        assert!(!settings.tracks_combinations());
        settings.method = ManageInventoryMethod::ManageStockByAttributes;
        assert!(settings.tracks_combinations());
    }
}
