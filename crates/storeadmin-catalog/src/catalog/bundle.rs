//! Bundle items, their attribute filters and order snapshots.

use crate::ids::{
    AttributeValueId, BundleItemFilterId, BundleItemId, ProductId, VariantAttributeId,
};
use crate::money::Money;
use crate::CatalogError;
use serde::{Deserialize, Serialize};

/// Discount granted on a bundle item's price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BundleItemDiscount {
    /// Percentage off the unit price (0-100).
    Percentage(f64),
    /// Fixed amount off the unit price.
    Amount(Money),
}

impl BundleItemDiscount {
    /// Apply to a unit price. Never goes below zero.
    pub fn apply(&self, unit_price: Money) -> Result<Money, CatalogError> {
        let discounted = match self {
            BundleItemDiscount::Percentage(percent) => {
                unit_price.checked_sub(&unit_price.percentage(*percent))?
            }
            BundleItemDiscount::Amount(amount) => unit_price.checked_sub(amount)?,
        };
        Ok(discounted.non_negative())
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        match self {
            BundleItemDiscount::Percentage(percent) if !(0.0..=100.0).contains(percent) => Err(
                CatalogError::ValidationError(format!("discount percentage {} out of range", percent)),
            ),
            BundleItemDiscount::Amount(amount) if amount.is_negative() => Err(
                CatalogError::ValidationError("discount amount must not be negative".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// A child product placed in a bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductBundleItem {
    pub id: BundleItemId,
    pub bundle_product_id: ProductId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub discount: Option<BundleItemDiscount>,
    /// Overrides the child product name inside the bundle.
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub hide_thumbnail: bool,
    pub visible: bool,
    pub published: bool,
    pub display_order: i32,
    /// Restrict the child's attribute values to the filter rows.
    pub filter_attributes: bool,
}

impl ProductBundleItem {
    /// New bundle item with quantity 1, visible and published.
    pub fn new(bundle_product_id: ProductId, product_id: ProductId, display_order: i32) -> Self {
        Self {
            id: BundleItemId::new(0),
            bundle_product_id,
            product_id,
            quantity: 1,
            discount: None,
            name: None,
            short_description: None,
            hide_thumbnail: false,
            visible: true,
            published: true,
            display_order,
            filter_attributes: false,
        }
    }

    /// Whether the item shows up in the storefront and in order snapshots.
    pub fn is_active(&self) -> bool {
        self.visible && self.published
    }
}

/// Restricts (and optionally pre-selects) an attribute value for a bundle slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductBundleItemAttributeFilter {
    pub id: BundleItemFilterId,
    pub bundle_item_id: BundleItemId,
    pub attribute_id: VariantAttributeId,
    pub attribute_value_id: AttributeValueId,
    pub is_pre_selected: bool,
}

impl ProductBundleItemAttributeFilter {
    pub fn new(
        bundle_item_id: BundleItemId,
        attribute_id: VariantAttributeId,
        attribute_value_id: AttributeValueId,
        is_pre_selected: bool,
    ) -> Self {
        Self {
            id: BundleItemFilterId::new(0),
            bundle_item_id,
            attribute_id,
            attribute_value_id,
            is_pre_selected,
        }
    }
}

/// Snapshot of a bundle item taken when an order is placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleItemOrderData {
    pub bundle_item_id: BundleItemId,
    pub product_id: ProductId,
    pub sku: Option<String>,
    pub product_name: String,
    pub quantity: u32,
    pub display_order: i32,
    /// Tax-adjusted unit price; only set for per-item priced bundles.
    pub price_with_discount: Option<Money>,
    pub attributes_xml: String,
    pub per_item_shopping_cart: bool,
}
