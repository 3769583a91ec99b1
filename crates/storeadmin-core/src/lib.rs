//! Catalog administration operations for the StoreAdmin backend.
//!
//! - **Combinations**: bulk and single creation of attribute combinations
//! - **Bundles**: bundle item reconciliation, attribute filters, order snapshots
//! - **Tabs**: applying product edit forms tab by tab
//! - **Permissions**: operation-level authorization
//! - **Store**: the persistence seam and an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storeadmin_core::prelude::*;
//!
//! let store = Arc::new(InMemoryCatalogStore::new());
//! let tee = store.insert_product(Product::new("Tee", Money::new(1500, Currency::USD))).unwrap();
//! let color = store
//!     .insert_variant_attribute(ProductVariantAttribute::new(
//!         tee,
//!         ProductAttributeId::new(1),
//!         "Color",
//!         AttributeControlType::DropdownList,
//!     ))
//!     .unwrap();
//! for name in ["Red", "Blue"] {
//!     store.insert_attribute_value(ProductVariantAttributeValue::new(color, name)).unwrap();
//! }
//!
//! let admin = CatalogAdmin::new(store, AdminConfig::default(), Arc::new(TracingPublisher));
//! let staff = Principal::new("sam", vec![Role::Staff]);
//! let outcome = admin.create_all_combinations(&staff, tee).unwrap();
//! assert_eq!(outcome.created.len(), 2);
//! ```

pub mod batch;
pub mod bundle;
pub mod combinations;
pub mod config;
pub mod error;
pub mod events;
pub mod form;
pub mod permissions;
pub mod pricing;
pub mod service;
pub mod store;
pub mod tabs;

pub use error::{AdminError, Result};
pub use service::CatalogAdmin;

/// Prelude for convenient imports.
pub mod prelude {
    pub use storeadmin_catalog::prelude::*;

    pub use crate::batch::{limit_batch, BatchSelection};
    pub use crate::bundle::{AddItemsOutcome, BundleItemEdit, BundleItemUpdate, BundleReconciler};
    pub use crate::combinations::{
        AddCombinationOutcome, CombinationGenerator, CombinationOverrides, CreateAllOutcome,
    };
    pub use crate::config::{AdminConfig, BatchConfig, CombinationDefaults, TaxConfig};
    pub use crate::error::AdminError;
    pub use crate::events::{AdminEvent, EventPublisher, RecordingPublisher, TracingPublisher};
    pub use crate::form::FormData;
    pub use crate::permissions::{Operation, Permission, PermissionPolicy, Principal, Role};
    pub use crate::pricing::{CatalogPriceCalculator, FlatRateTax, PriceCalculator, TaxCalculator};
    pub use crate::service::CatalogAdmin;
    pub use crate::store::{CatalogSnapshot, CatalogStore, InMemoryCatalogStore};
    pub use crate::tabs::{ProductEditModel, ProductFormMapper, ProductTab, TabApplyError};
}
