//! Newtype IDs for type-safe identifiers.
//!
//! Catalog rows are keyed by store-assigned integers. Wrapping them keeps a
//! `BundleItemId` from being passed where a `ProductId` is expected, which
//! matters here because admin forms carry several kinds of ids side by side.

use crate::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to generate integer newtype ID structs.
macro_rules! define_id {
    ($name:ident, $kind:literal) => {
        #[doc = concat!("Identifier of a ", $kind, ".")]
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw id.
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Whether this id has been assigned by a store (ids start at 1).
            pub const fn is_assigned(&self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = CatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| CatalogError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

define_id!(ProductId, "product");
define_id!(ProductAttributeId, "product attribute");
define_id!(VariantAttributeId, "variant attribute");
define_id!(AttributeValueId, "attribute value");
define_id!(CombinationId, "attribute combination");
define_id!(BundleItemId, "bundle item");
define_id!(BundleItemFilterId, "bundle item filter");
define_id!(DiscountId, "discount");
define_id!(StoreId, "store");
define_id!(CustomerRoleId, "customer role");
define_id!(TaxCategoryId, "tax category");
