//! Product edit tabs.
//!
//! The product edit page is split into tabs that load lazily. A posted model
//! lists the tabs the operator actually opened in `loaded_tabs`; only those
//! are applied, so fields of unopened tabs keep their stored values.
//!
//! Each [`ProductTab`] owns a disjoint set of product fields and maps to one
//! pure handler taking the model and the product by value. Tabs run in the
//! fixed order of [`ProductTab::ALL`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use storeadmin_catalog::prelude::*;
use thiserror::Error;

use crate::error::{AdminError, Result};

/// A section of the product edit page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductTab {
    Info,
    Inventory,
    BundleItems,
    Price,
    Discounts,
    Seo,
    Acl,
    Stores,
}

impl ProductTab {
    /// All tabs in application order.
    pub const ALL: [ProductTab; 8] = [
        ProductTab::Info,
        ProductTab::Inventory,
        ProductTab::BundleItems,
        ProductTab::Price,
        ProductTab::Discounts,
        ProductTab::Seo,
        ProductTab::Acl,
        ProductTab::Stores,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductTab::Info => "info",
            ProductTab::Inventory => "inventory",
            ProductTab::BundleItems => "bundle_items",
            ProductTab::Price => "price",
            ProductTab::Discounts => "discounts",
            ProductTab::Seo => "seo",
            ProductTab::Acl => "acl",
            ProductTab::Stores => "stores",
        }
    }

    /// The handler owning this tab's fields.
    pub fn handler(&self) -> TabHandler {
        match self {
            ProductTab::Info => apply_info,
            ProductTab::Inventory => apply_inventory,
            ProductTab::BundleItems => apply_bundle_items,
            ProductTab::Price => apply_price,
            ProductTab::Discounts => apply_discounts,
            ProductTab::Seo => apply_seo,
            ProductTab::Acl => apply_acl,
            ProductTab::Stores => apply_stores,
        }
    }

    /// Resolve posted tab names into the tabs to apply, in application order.
    ///
    /// Names are matched case-insensitively, ignoring `-` and `_`, so both
    /// `"bundle-items"` and `"BundleItems"` work. Unknown names are skipped.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Vec<ProductTab> {
        let mut tabs = BTreeSet::new();
        for name in names {
            match name.as_ref().parse::<ProductTab>() {
                Ok(tab) => {
                    tabs.insert(tab);
                }
                Err(_) => tracing::debug!(tab = name.as_ref(), "ignoring unknown product tab"),
            }
        }
        tabs.into_iter().collect()
    }
}

impl fmt::Display for ProductTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductTab {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        ProductTab::ALL
            .iter()
            .copied()
            .find(|tab| tab.as_str().replace('_', "") == normalized)
            .ok_or_else(|| AdminError::invalid_form("loaded_tabs", format!("unknown tab '{}'", s)))
    }
}

/// Pure tab handler: applies its fields of the model to the product.
pub type TabHandler = fn(&ProductEditModel, Product) -> Result<Product>;

/// General information fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoTab {
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
}

/// Price and tax fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTab {
    pub price: Option<Money>,
    pub old_price: Option<Money>,
    pub product_cost: Option<Money>,
    pub special_price: Option<SpecialPrice>,
    pub tier_prices: Vec<TierPrice>,
    pub tax_category_id: Option<TaxCategoryId>,
    pub is_tax_exempt: bool,
    pub disable_buy_button: bool,
    pub call_for_price: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountsTab {
    pub applied_discount_ids: Vec<DiscountId>,
}

/// Customer roles allowed to see the product. Empty means everyone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclTab {
    pub role_ids: Vec<CustomerRoleId>,
}

/// Stores the product is sold in. Empty means all stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoresTab {
    pub store_ids: Vec<StoreId>,
}

/// The bound product edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductEditModel {
    pub id: ProductId,
    /// Names of the tabs the operator opened.
    pub loaded_tabs: Vec<String>,
    pub info: InfoTab,
    pub inventory: InventorySettings,
    pub bundle_items: BundleSettings,
    pub price: PriceTab,
    pub discounts: DiscountsTab,
    pub seo: SeoSettings,
    pub acl: AclTab,
    pub stores: StoresTab,
}

impl ProductEditModel {
    /// Prefill a model from a stored product with the given tabs loaded.
    pub fn from_product(product: &Product, loaded_tabs: &[ProductTab]) -> Self {
        Self {
            id: product.id,
            loaded_tabs: loaded_tabs.iter().map(|t| t.as_str().to_string()).collect(),
            info: InfoTab {
                name: product.name.clone(),
                sku: product.sku.clone(),
                product_type: product.product_type,
                published: product.published,
                short_description: product.short_description.clone(),
                full_description: product.full_description.clone(),
                admin_comment: product.admin_comment.clone(),
                is_download: product.is_download,
                is_recurring: product.is_recurring,
                is_gift_card: product.is_gift_card,
                display_order: product.display_order,
            },
            inventory: product.inventory.clone(),
            bundle_items: product.bundle.clone(),
            price: PriceTab {
                price: Some(product.price),
                old_price: product.old_price,
                product_cost: product.product_cost,
                special_price: product.special_price,
                tier_prices: product.tier_prices.clone(),
                tax_category_id: product.tax_category_id,
                is_tax_exempt: product.is_tax_exempt,
                disable_buy_button: product.disable_buy_button,
                call_for_price: product.call_for_price,
            },
            discounts: DiscountsTab {
                applied_discount_ids: product.applied_discount_ids.clone(),
            },
            seo: product.seo.clone(),
            acl: AclTab {
                role_ids: product.acl_role_ids.clone(),
            },
            stores: StoresTab {
                store_ids: product.store_ids.clone(),
            },
        }
    }

    /// Tabs that will be applied, in application order.
    pub fn tabs(&self) -> Vec<ProductTab> {
        ProductTab::resolve(&self.loaded_tabs)
    }
}

fn apply_info(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    let info = &model.info;
    let name = info.name.trim();
    if name.is_empty() {
        return Err(AdminError::invalid_form("info.name", "name is required"));
    }

    product.name = name.to_string();
    product.sku = info.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    product.product_type = info.product_type;
    product.published = info.published;
    product.short_description = info.short_description.clone();
    product.full_description = info.full_description.clone();
    product.admin_comment = info.admin_comment.clone();
    product.is_download = info.is_download;
    product.is_recurring = info.is_recurring;
    product.is_gift_card = info.is_gift_card;
    product.display_order = info.display_order;
    Ok(product)
}

fn apply_inventory(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    model.inventory.validate()?;
    product.inventory = model.inventory.clone();
    Ok(product)
}

fn apply_bundle_items(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    if !product.is_bundle() {
        if model.bundle_items != BundleSettings::default() {
            return Err(AdminError::NotABundle(product.id));
        }
        return Ok(product);
    }
    product.bundle = model.bundle_items.clone();
    Ok(product)
}

fn apply_price(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    let tab = &model.price;
    let currency = product.currency();
    let check = |field: &str, money: &Money| -> Result<()> {
        if money.currency != currency {
            return Err(AdminError::invalid_form(
                field,
                format!("expected {}, got {}", currency.code(), money.currency.code()),
            ));
        }
        if money.is_negative() {
            return Err(AdminError::invalid_form(field, "must not be negative"));
        }
        Ok(())
    };

    if let Some(price) = &tab.price {
        check("price.price", price)?;
        product.price = *price;
    }
    if let Some(old_price) = &tab.old_price {
        check("price.old_price", old_price)?;
    }
    if let Some(cost) = &tab.product_cost {
        check("price.product_cost", cost)?;
    }
    if let Some(special) = &tab.special_price {
        check("price.special_price", &special.price)?;
        if let (Some(start), Some(end)) = (special.starts_at, special.ends_at) {
            if start > end {
                return Err(AdminError::invalid_form(
                    "price.special_price",
                    "window ends before it starts",
                ));
            }
        }
    }

    let mut tiers = tab.tier_prices.clone();
    for tier in &tiers {
        check("price.tier_prices", &tier.price)?;
        if tier.quantity == 0 {
            return Err(AdminError::invalid_form("price.tier_prices", "quantity must be at least 1"));
        }
    }
    tiers.sort_by_key(|tier| tier.quantity);
    if tiers.windows(2).any(|pair| pair[0].quantity == pair[1].quantity) {
        return Err(AdminError::invalid_form("price.tier_prices", "duplicate tier quantity"));
    }

    product.old_price = tab.old_price;
    product.product_cost = tab.product_cost;
    product.special_price = tab.special_price;
    product.tier_prices = tiers;
    product.tax_category_id = tab.tax_category_id;
    product.is_tax_exempt = tab.is_tax_exempt;
    product.disable_buy_button = tab.disable_buy_button;
    product.call_for_price = tab.call_for_price;
    Ok(product)
}

fn sorted_unique<T: Ord + Copy>(ids: &[T]) -> Vec<T> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

fn apply_discounts(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    product.applied_discount_ids = sorted_unique(&model.discounts.applied_discount_ids);
    Ok(product)
}

/// Lowercase, ASCII alphanumerics separated by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn apply_seo(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    let mut seo = model.seo.clone();
    let source = if seo.slug.trim().is_empty() {
        product.name.as_str()
    } else {
        seo.slug.as_str()
    };
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AdminError::invalid_form("seo.slug", "cannot derive a slug"));
    }
    seo.slug = slug;
    product.seo = seo;
    Ok(product)
}

fn apply_acl(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    product.acl_role_ids = sorted_unique(&model.acl.role_ids);
    product.subject_to_acl = !product.acl_role_ids.is_empty();
    Ok(product)
}

fn apply_stores(model: &ProductEditModel, mut product: Product) -> Result<Product> {
    product.store_ids = sorted_unique(&model.stores.store_ids);
    product.limited_to_stores = !product.store_ids.is_empty();
    Ok(product)
}

/// A tab handler failed. Tabs applied before it are kept in `product`.
#[derive(Error, Debug)]
#[error("tab {tab} failed: {source}")]
pub struct TabApplyError {
    pub tab: ProductTab,
    pub product: Box<Product>,
    #[source]
    pub source: AdminError,
}

/// Applies a bound edit model to a product tab by tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFormMapper;

impl ProductFormMapper {
    pub fn new() -> Self {
        Self
    }

    /// Apply the loaded tabs of `model` to `product`.
    ///
    /// Nothing is saved or published here. On failure the error carries the
    /// product as left by the tabs that did succeed.
    pub fn apply(
        &self,
        model: &ProductEditModel,
        product: Product,
    ) -> std::result::Result<Product, TabApplyError> {
        let mut product = product;
        for tab in model.tabs() {
            let before = product.clone();
            product = match (tab.handler())(model, product) {
                Ok(updated) => updated,
                Err(source) => {
                    tracing::warn!(%tab, product_id = %before.id, error = %source, "product tab failed");
                    return Err(TabApplyError {
                        tab,
                        product: Box::new(before),
                        source,
                    });
                }
            };
            tracing::debug!(%tab, product_id = %product.id, "applied product tab");
        }

        product.touch();
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn stored() -> Product {
        let mut product = Product::new("Desk Lamp", usd(4500)).with_sku("LAMP-1");
        product.id = ProductId::new(9);
        product.seo.slug = "desk-lamp".to_string();
        product.store_ids = vec![StoreId::new(2)];
        product.limited_to_stores = true;
        product
    }


    #[test]
    fn test_resolve_orders_and_dedups() {
        let tabs = ProductTab::resolve(&["seo", "Info", "bogus", "SEO", "bundle-items"]);
        assert_eq!(tabs, vec![ProductTab::Info, ProductTab::BundleItems, ProductTab::Seo]);
    }

    #[test]
    fn test_unloaded_tabs_are_untouched() {
        let product = stored();
        let mut model = ProductEditModel::from_product(&product, &[ProductTab::Info]);
        model.info.name = "Floor Lamp".to_string();
        model.stores.store_ids.clear();
        model.seo.slug = String::new();

        let updated = ProductFormMapper::new().apply(&model, product).unwrap();

        assert_eq!(updated.name, "Floor Lamp");
        assert_eq!(updated.seo.slug, "desk-lamp");
        assert_eq!(updated.store_ids, vec![StoreId::new(2)]);
        assert!(updated.limited_to_stores);
    }

    #[test]
    fn test_failure_keeps_earlier_tabs() {
        let product = stored();
        let mut model =
            ProductEditModel::from_product(&product, &[ProductTab::Info, ProductTab::Price]);
        model.info.name = "Renamed".to_string();
        model.price.price = Some(usd(-1));

        let err = ProductFormMapper::new().apply(&model, product).unwrap_err();

        assert_eq!(err.tab, ProductTab::Price);
        assert_eq!(err.product.name, "Renamed");
        assert_eq!(err.product.price, usd(4500));
    }

    #[test]
    fn test_bundle_tab_on_simple_product() {
        let product = stored();
        let mut model = ProductEditModel::from_product(&product, &[ProductTab::BundleItems]);
        model.bundle_items.per_item_pricing = true;

        let err = ProductFormMapper::new().apply(&model, product).unwrap_err();
        assert!(matches!(err.source, AdminError::NotABundle(_)));
    }

    #[test]
    fn test_seo_slug_from_name() {
        let product = stored();
        let mut model = ProductEditModel::from_product(&product, &[ProductTab::Seo]);
        model.seo.slug = "  ".to_string();

        let updated = apply_seo(&model, product).unwrap();
        assert_eq!(updated.seo.slug, "desk-lamp");
        assert_eq!(slugify("Rust & Cargo: 2nd Ed."), "rust-cargo-2nd-ed");
    }

    #[test]
    fn test_acl_and_store_flags_follow_ids() {
        let product = stored();
        let mut model =
            ProductEditModel::from_product(&product, &[ProductTab::Acl, ProductTab::Stores]);
        model.acl.role_ids = vec![CustomerRoleId::new(3), CustomerRoleId::new(3)];
        model.stores.store_ids.clear();

        let updated = ProductFormMapper::new().apply(&model, product).unwrap();
        assert!(updated.subject_to_acl);
        assert_eq!(updated.acl_role_ids, vec![CustomerRoleId::new(3)]);
        assert!(!updated.limited_to_stores);
    }

    #[test]
    fn test_tier_prices_sorted_and_validated() {
        let product = stored();
        let mut model = ProductEditModel::from_product(&product, &[ProductTab::Price]);
        model.price.tier_prices = vec![
            TierPrice { quantity: 10, price: usd(3500) },
            TierPrice { quantity: 2, price: usd(4000) },
        ];
        let updated = apply_price(&model, product.clone()).unwrap();
        assert_eq!(updated.tier_prices[0].quantity, 2);

        model.price.tier_prices.push(TierPrice { quantity: 2, price: usd(3900) });
        assert!(apply_price(&model, product).is_err());
    }
}
