//! Attribute combination records.

use crate::attribute_xml::AttributeSelection;
use crate::ids::{CombinationId, ProductId};
use crate::money::Money;
use crate::CatalogError;
use serde::{Deserialize, Serialize};

/// A persisted attribute tuple with its own stock and price overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariantAttributeCombination {
    pub id: CombinationId,
    pub product_id: ProductId,
    /// Canonical attribute XML of the selection.
    pub attributes_xml: String,
    pub sku: Option<String>,
    pub gtin: Option<String>,
    pub stock_quantity: i64,
    pub allow_out_of_stock_orders: bool,
    /// Replaces the product price when this combination is selected.
    pub price: Option<Money>,
    pub is_active: bool,
}

impl ProductVariantAttributeCombination {
    /// Create a combination for a selection, storing its canonical XML.
    pub fn new(product_id: ProductId, selection: &AttributeSelection) -> Result<Self, CatalogError> {
        Ok(Self {
            id: CombinationId::new(0),
            product_id,
            attributes_xml: selection.to_xml()?,
            sku: None,
            gtin: None,
            stock_quantity: 0,
            allow_out_of_stock_orders: false,
            price: None,
            is_active: true,
        })
    }

    /// Decode the stored attribute XML.
    pub fn selection(&self) -> Result<AttributeSelection, CatalogError> {
        AttributeSelection::from_xml(&self.attributes_xml)
    }

    /// Price override taken into account for the product's lowest-price cache.
    pub fn effective_price_override(&self) -> Option<Money> {
        if self.is_active {
            self.price
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AttributeValueId, VariantAttributeId};
    use crate::money::Currency;

    #[test]
    fn test_new_combination_stores_canonical_xml() {
        let selection = AttributeSelection::new()
            .with_value_id(VariantAttributeId::new(1), AttributeValueId::new(2));
        let combination =
            ProductVariantAttributeCombination::new(ProductId::new(5), &selection).unwrap();

        assert_eq!(combination.selection().unwrap(), selection);
        assert!(combination.is_active);
    }

    #[test]
    fn test_inactive_price_override_is_ignored() {
        let mut combination =
            ProductVariantAttributeCombination::new(ProductId::new(5), &AttributeSelection::new())
                .unwrap();
        combination.price = Some(Money::new(500, Currency::USD));
        assert!(combination.effective_price_override().is_some());

        combination.is_active = false;
        assert!(combination.effective_price_override().is_none());
    }
}
