//! Catalog domain types for the StoreAdmin backend.
//!
//! This crate provides the entities the admin operations work on:
//!
//! - **Products**: general info, inventory, pricing, SEO, ACL and store mappings
//! - **Variant attributes**: attribute mappings and their selectable values
//! - **Combinations**: persisted attribute tuples with stock/price overrides
//! - **Bundles**: bundle items, their attribute filters and order snapshots
//! - **Attribute XML**: the canonical serialized form of an attribute selection
//!
//! # Example
//!
//! ```rust
//! use storeadmin_catalog::prelude::*;
//!
//! let mut selection = AttributeSelection::new();
//! selection.add_value(VariantAttributeId::new(2), "11");
//! selection.add_value(VariantAttributeId::new(1), "4");
//!
//! let xml = selection.to_xml().unwrap();
//! let parsed = AttributeSelection::from_xml(&xml).unwrap();
//! assert_eq!(parsed, selection);
//! ```

pub mod attribute_xml;
pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;

pub use attribute_xml::AttributeSelection;
pub use error::CatalogError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::attribute_xml::AttributeSelection;
    pub use crate::error::CatalogError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{
        AttributeControlType, AttributeValueType, BackorderMode, BundleItemDiscount,
        BundleItemOrderData, BundleSettings, InventorySettings, ManageInventoryMethod, Product,
        ProductBundleItem, ProductBundleItemAttributeFilter, ProductType,
        ProductVariantAttribute, ProductVariantAttributeCombination,
        ProductVariantAttributeValue, SeoSettings, SpecialPrice, TierPrice,
    };
}
