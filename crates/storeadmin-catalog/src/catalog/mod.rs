//! Product catalog module.
//!
//! Contains types for products, inventory settings, variant attributes,
//! attribute combinations and bundle items.

mod attribute;
mod bundle;
mod combination;
mod inventory;
mod product;

pub use attribute::{
    AttributeControlType, AttributeValueType, ProductVariantAttribute,
    ProductVariantAttributeValue,
};
pub use bundle::{
    BundleItemDiscount, BundleItemOrderData, ProductBundleItem, ProductBundleItemAttributeFilter,
};
pub use combination::ProductVariantAttributeCombination;
pub use inventory::{BackorderMode, InventorySettings, ManageInventoryMethod};
pub use product::{BundleSettings, Product, ProductType, SeoSettings, SpecialPrice, TierPrice};

/// Get current Unix timestamp.
pub fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
