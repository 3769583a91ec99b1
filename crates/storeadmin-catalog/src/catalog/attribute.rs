//! Variant attribute mappings and their values.

use crate::ids::{AttributeValueId, ProductAttributeId, ProductId, VariantAttributeId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// How an attribute is presented to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttributeControlType {
    #[default]
    DropdownList,
    RadioList,
    Checkboxes,
    Boxes,
    ColorSquares,
    TextBox,
    MultilineTextbox,
    Datepicker,
    FileUpload,
}

impl AttributeControlType {
    /// Whether the control presents discrete choices backed by attribute values.
    pub fn should_have_values(&self) -> bool {
        matches!(
            self,
            AttributeControlType::DropdownList
                | AttributeControlType::RadioList
                | AttributeControlType::Checkboxes
                | AttributeControlType::Boxes
                | AttributeControlType::ColorSquares
        )
    }
}

/// Kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttributeValueType {
    #[default]
    Simple,
    /// Selecting the value adds a linked product.
    ProductLinkage,
}

/// An attribute assigned to a product (e.g. "Color" on a T-shirt).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariantAttribute {
    pub id: VariantAttributeId,
    pub product_id: ProductId,
    /// The global attribute definition this mapping refers to.
    pub attribute_id: ProductAttributeId,
    /// Label shown to the customer.
    pub text_prompt: String,
    pub is_required: bool,
    pub control_type: AttributeControlType,
    pub display_order: i32,
}

impl ProductVariantAttribute {
    pub fn new(
        product_id: ProductId,
        attribute_id: ProductAttributeId,
        text_prompt: impl Into<String>,
        control_type: AttributeControlType,
    ) -> Self {
        Self {
            id: VariantAttributeId::new(0),
            product_id,
            attribute_id,
            text_prompt: text_prompt.into(),
            is_required: true,
            control_type,
            display_order: 0,
        }
    }

    pub fn should_have_values(&self) -> bool {
        self.control_type.should_have_values()
    }
}

/// One selectable value of a variant attribute (e.g. "Red").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariantAttributeValue {
    pub id: AttributeValueId,
    pub variant_attribute_id: VariantAttributeId,
    pub name: String,
    pub alias: Option<String>,
    pub price_adjustment: Option<Money>,
    /// Weight adjustment in grams.
    pub weight_adjustment: i64,
    pub is_pre_selected: bool,
    pub display_order: i32,
    pub value_type: AttributeValueType,
    pub linked_product_id: Option<ProductId>,
    /// Quantity of the linked product added per selection.
    pub quantity: u32,
}

impl ProductVariantAttributeValue {
    pub fn new(variant_attribute_id: VariantAttributeId, name: impl Into<String>) -> Self {
        Self {
            id: AttributeValueId::new(0),
            variant_attribute_id,
            name: name.into(),
            alias: None,
            price_adjustment: None,
            weight_adjustment: 0,
            is_pre_selected: false,
            display_order: 0,
            value_type: AttributeValueType::Simple,
            linked_product_id: None,
            quantity: 1,
        }
    }

    /// Create a value that links another product.
    pub fn linkage(
        variant_attribute_id: VariantAttributeId,
        name: impl Into<String>,
        linked_product_id: ProductId,
    ) -> Self {
        Self {
            value_type: AttributeValueType::ProductLinkage,
            linked_product_id: Some(linked_product_id),
            ..Self::new(variant_attribute_id, name)
        }
    }

    pub fn is_product_linkage(&self) -> bool {
        self.value_type == AttributeValueType::ProductLinkage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_control_types() {
        assert!(AttributeControlType::DropdownList.should_have_values());
        assert!(AttributeControlType::ColorSquares.should_have_values());
        assert!(!AttributeControlType::TextBox.should_have_values());
        assert!(!AttributeControlType::FileUpload.should_have_values());
    }

    #[test]
    fn test_linkage_value() {
        let value = ProductVariantAttributeValue::linkage(
            VariantAttributeId::new(3),
            "Add case",
            ProductId::new(40),
        );
        assert!(value.is_product_linkage());
        assert_eq!(value.linked_product_id, Some(ProductId::new(40)));
        assert_eq!(value.quantity, 1);
    }
}
