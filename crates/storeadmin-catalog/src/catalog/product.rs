//! Product types.

use crate::catalog::{current_timestamp, InventorySettings};
use crate::error::CatalogError;
use crate::ids::{CustomerRoleId, DiscountId, ProductId, StoreId, TaxCategoryId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Product type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductType {
    /// Standalone product, optionally with variant attributes.
    #[default]
    Simple,
    /// Groups associated products on one page.
    Grouped,
    /// Sold as one unit made of bundle items.
    Bundle,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
            ProductType::Grouped => "grouped",
            ProductType::Bundle => "bundle",
        }
    }
}

impl FromStr for ProductType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(ProductType::Simple),
            "grouped" => Ok(ProductType::Grouped),
            "bundle" => Ok(ProductType::Bundle),
            _ => Err(CatalogError::ValidationError(format!(
                "unknown product type: {}",
                s
            ))),
        }
    }
}

/// Special price with an optional validity window (Unix seconds, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialPrice {
    pub price: Money,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
}

impl SpecialPrice {
    /// Whether the special price applies at `now`.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.starts_at.map_or(true, |start| start <= now)
            && self.ends_at.map_or(true, |end| now <= end)
    }
}

/// Unit price applying from a minimum quantity on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPrice {
    pub quantity: u32,
    pub price: Money,
}

/// Bundle-specific product settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleSettings {
    /// Heading shown above the bundle item list.
    pub title_text: Option<String>,
    /// Price the bundle as the sum of its items instead of its own price.
    pub per_item_pricing: bool,
    /// Ship bundle items individually.
    pub per_item_shipping: bool,
    /// Show bundle items as separate shopping cart lines.
    pub per_item_shopping_cart: bool,
}

/// Search engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoSettings {
    pub meta_title: Option<String>,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    /// URL slug. Always lowercase ASCII words joined by '-'.
    pub slug: String,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub product_type: ProductType,
    pub published: bool,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub admin_comment: Option<String>,
    pub is_download: bool,
    pub is_recurring: bool,
    pub is_gift_card: bool,
    pub display_order: i32,

    // Price tab
    pub price: Money,
    pub old_price: Option<Money>,
    pub product_cost: Option<Money>,
    pub special_price: Option<SpecialPrice>,
    pub tier_prices: Vec<TierPrice>,
    pub tax_category_id: Option<TaxCategoryId>,
    pub is_tax_exempt: bool,
    pub disable_buy_button: bool,
    pub call_for_price: bool,

    pub inventory: InventorySettings,
    pub bundle: BundleSettings,
    pub seo: SeoSettings,

    // Discounts, ACL and store mappings
    pub applied_discount_ids: Vec<DiscountId>,
    pub subject_to_acl: bool,
    pub acl_role_ids: Vec<CustomerRoleId>,
    pub limited_to_stores: bool,
    pub store_ids: Vec<StoreId>,

    /// Cached minimum price override among active attribute combinations.
    pub lowest_attribute_combination_price: Option<Money>,

    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new published simple product. The id is assigned by the store.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::new(0),
            name: name.into(),
            sku: None,
            product_type: ProductType::Simple,
            published: true,
            short_description: None,
            full_description: None,
            admin_comment: None,
            is_download: false,
            is_recurring: false,
            is_gift_card: false,
            display_order: 0,
            price,
            old_price: None,
            product_cost: None,
            special_price: None,
            tier_prices: Vec::new(),
            tax_category_id: None,
            is_tax_exempt: false,
            disable_buy_button: false,
            call_for_price: false,
            inventory: InventorySettings::default(),
            bundle: BundleSettings::default(),
            seo: SeoSettings::default(),
            applied_discount_ids: Vec::new(),
            subject_to_acl: false,
            acl_role_ids: Vec::new(),
            limited_to_stores: false,
            store_ids: Vec::new(),
            lowest_attribute_combination_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new bundle product.
    pub fn bundle(name: impl Into<String>, price: Money) -> Self {
        let mut product = Self::new(name, price);
        product.product_type = ProductType::Bundle;
        product
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn is_bundle(&self) -> bool {
        self.product_type == ProductType::Bundle
    }

    /// Whether this product may be placed into a bundle.
    ///
    /// Only simple, non-downloadable, non-recurring products qualify.
    /// Attribute-level restrictions (product linkage) are checked by the caller
    /// since they need the attribute values.
    pub fn can_be_bundle_item(&self) -> bool {
        self.product_type == ProductType::Simple && !self.is_download && !self.is_recurring
    }

    pub fn currency(&self) -> Currency {
        self.price.currency
    }

    /// Tier price for a quantity: the entry with the largest threshold not above it.
    pub fn tier_price_for(&self, quantity: u32) -> Option<Money> {
        self.tier_prices
            .iter()
            .filter(|tier| tier.quantity <= quantity)
            .max_by_key(|tier| tier.quantity)
            .map(|tier| tier.price)
    }

    /// Record a modification.
    pub fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    #[test]
    fn test_product_creation() {
        let product = Product::new("Rust Mug", usd(1299)).with_sku("MUG-1");
        assert_eq!(product.sku.as_deref(), Some("MUG-1"));
        assert!(product.published);
        assert!(!product.id.is_assigned());
        assert!(product.can_be_bundle_item());
    }

    #[test]
    fn test_bundle_eligibility() {
        let bundle = Product::bundle("Starter Kit", usd(4999));
        assert!(bundle.is_bundle());
        assert!(!bundle.can_be_bundle_item());

        let mut download = Product::new("E-Book", usd(999));
        download.is_download = true;
        assert!(!download.can_be_bundle_item());

        let mut grouped = Product::new("Group", usd(0));
        grouped.product_type = ProductType::Grouped;
        assert!(!grouped.can_be_bundle_item());
    }

    #[test]
    fn test_tier_price_for_quantity() {
        let mut product = Product::new("Pens", usd(200));
        product.tier_prices = vec![
            TierPrice { quantity: 10, price: usd(150) },
            TierPrice { quantity: 5, price: usd(180) },
        ];

        assert_eq!(product.tier_price_for(1), None);
        assert_eq!(product.tier_price_for(5), Some(usd(180)));
        assert_eq!(product.tier_price_for(12), Some(usd(150)));
    }

    #[test]
    fn test_special_price_window() {
        let special = SpecialPrice {
            price: usd(100),
            starts_at: Some(100),
            ends_at: Some(200),
        };
        assert!(!special.is_active_at(99));
        assert!(special.is_active_at(100));
        assert!(special.is_active_at(200));
        assert!(!special.is_active_at(201));
    }

    #[test]
    fn test_product_type_from_str() {
        assert_eq!("Bundle".parse::<ProductType>(), Ok(ProductType::Bundle));
        assert!(matches!(
            "kit".parse::<ProductType>(),
            Err(CatalogError::ValidationError(_))
        ));
    }
}
