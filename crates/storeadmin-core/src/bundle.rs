//! Bundle item management.
//!
//! Adds child products to bundle products, saves per-item settings and
//! attribute filters, and takes the order-time snapshot of a bundle.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use storeadmin_catalog::prelude::*;

use crate::error::{AdminError, Result};
use crate::form::FormData;
use crate::pricing::{PriceCalculator, TaxCalculator};
use crate::store::CatalogStore;

/// Form key prefix carrying the allowed value ids of one attribute.
pub const FILTER_KEY_PREFIX: &str = "attribute_filter_";
/// Form key prefix carrying the pre-selected value id of one attribute.
pub const PRESELECT_KEY_PREFIX: &str = "attribute_preselect_";

/// Result of adding products to a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemsOutcome {
    pub inserted: Vec<BundleItemId>,
    pub warnings: Vec<String>,
    /// Whether the product picker can close; false while warnings need reading.
    pub close_popup: bool,
}

/// Editable settings of a bundle item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleItemEdit {
    pub quantity: u32,
    pub discount: Option<BundleItemDiscount>,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub hide_thumbnail: bool,
    pub visible: bool,
    pub published: bool,
    pub display_order: i32,
    pub filter_attributes: bool,
}

impl BundleItemEdit {
    /// Start from the item's current settings.
    pub fn from_item(item: &ProductBundleItem) -> Self {
        Self {
            quantity: item.quantity,
            discount: item.discount,
            name: item.name.clone(),
            short_description: item.short_description.clone(),
            hide_thumbnail: item.hide_thumbnail,
            visible: item.visible,
            published: item.published,
            display_order: item.display_order,
            filter_attributes: item.filter_attributes,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(AdminError::invalid_form("quantity", "must be at least 1"));
        }
        if let Some(discount) = &self.discount {
            discount.validate()?;
        }
        Ok(())
    }

    fn apply_to(&self, item: &mut ProductBundleItem) {
        let blank_to_none =
            |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

        item.quantity = self.quantity;
        item.discount = self.discount;
        item.name = blank_to_none(&self.name);
        item.short_description = blank_to_none(&self.short_description);
        item.hide_thumbnail = self.hide_thumbnail;
        item.visible = self.visible;
        item.published = self.published;
        item.display_order = self.display_order;
        item.filter_attributes = self.filter_attributes;
    }
}

/// A saved bundle item with its filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleItemUpdate {
    pub item: ProductBundleItem,
    pub filters: Vec<ProductBundleItemAttributeFilter>,
}

/// Maintains bundle items and their attribute filters.
pub struct BundleReconciler {
    store: Arc<dyn CatalogStore>,
    prices: Arc<dyn PriceCalculator>,
    tax: Arc<dyn TaxCalculator>,
}

impl BundleReconciler {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        prices: Arc<dyn PriceCalculator>,
        tax: Arc<dyn TaxCalculator>,
    ) -> Self {
        Self { store, prices, tax }
    }

    fn require_bundle(&self, bundle_id: ProductId) -> Result<Product> {
        let product = self
            .store
            .product(bundle_id)?
            .ok_or_else(|| AdminError::not_found("product", bundle_id.get()))?;
        if !product.is_bundle() {
            return Err(AdminError::NotABundle(bundle_id));
        }
        Ok(product)
    }

    fn require_item(&self, id: BundleItemId) -> Result<ProductBundleItem> {
        self.store
            .bundle_item(id)?
            .ok_or_else(|| AdminError::not_found("bundle item", id.get()))
    }

    fn has_product_linkage(&self, product_id: ProductId) -> Result<bool> {
        for attribute in self.store.variant_attributes(product_id)? {
            if self
                .store
                .attribute_values(attribute.id)?
                .iter()
                .any(ProductVariantAttributeValue::is_product_linkage)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Add the candidate products to a bundle, in submitted order.
    ///
    /// Candidates that are missing, the bundle itself, already in the bundle,
    /// or not simple physical products are skipped. Candidates with
    /// product-linkage attribute values produce a warning. Items inserted
    /// before an error stay in place.
    pub fn add_items(&self, bundle_id: ProductId, candidates: &[ProductId]) -> Result<AddItemsOutcome> {
        self.require_bundle(bundle_id)?;
        let mut outcome = AddItemsOutcome::default();
        let mut seen: HashSet<ProductId> = self
            .store
            .bundle_items(bundle_id)?
            .iter()
            .map(|item| item.product_id)
            .collect();

        for (position, candidate_id) in candidates.iter().copied().enumerate() {
            if candidate_id == bundle_id {
                tracing::debug!(%bundle_id, "skipping bundle as its own item");
                continue;
            }
            if !seen.insert(candidate_id) {
                tracing::debug!(%bundle_id, %candidate_id, "skipping product already in bundle");
                continue;
            }
            let Some(candidate) = self.store.product(candidate_id)? else {
                tracing::debug!(%bundle_id, %candidate_id, "skipping missing product");
                continue;
            };
            if !candidate.can_be_bundle_item() {
                tracing::debug!(
                    %bundle_id,
                    %candidate_id,
                    product_type = candidate.product_type.as_str(),
                    "skipping product that cannot be a bundle item"
                );
                continue;
            }
            if self.has_product_linkage(candidate_id)? {
                tracing::warn!(%bundle_id, %candidate_id, "bundle candidate has linked attribute values");
                outcome.warnings.push(format!(
                    "{} cannot be added to a bundle because its attributes link other products",
                    candidate.name
                ));
                continue;
            }

            let display_order = i32::try_from(position + 1).unwrap_or(i32::MAX);
            let item = ProductBundleItem::new(bundle_id, candidate_id, display_order);
            outcome.inserted.push(self.store.insert_bundle_item(item)?);
        }

        outcome.close_popup = outcome.warnings.is_empty();
        tracing::info!(
            %bundle_id,
            inserted = outcome.inserted.len(),
            warnings = outcome.warnings.len(),
            "added bundle items"
        );
        Ok(outcome)
    }

    pub fn list(&self, bundle_id: ProductId) -> Result<Vec<ProductBundleItem>> {
        self.require_bundle(bundle_id)?;
        self.store.bundle_items(bundle_id)
    }

    pub fn filters(&self, item_id: BundleItemId) -> Result<Vec<ProductBundleItemAttributeFilter>> {
        self.require_item(item_id)?;
        self.store.bundle_item_filters(item_id)
    }

    /// Derive filter rows for a bundle item from posted form fields.
    ///
    /// `attribute_filter_{id}` lists the allowed value ids of a variant
    /// attribute of the child product and `attribute_preselect_{id}` names the
    /// pre-selected one. Unknown attributes or values are rejected.
    pub fn filters_from_form(
        &self,
        item: &ProductBundleItem,
        form: &FormData,
    ) -> Result<Vec<ProductBundleItemAttributeFilter>> {
        let mut allowed: HashMap<VariantAttributeId, BTreeSet<AttributeValueId>> = HashMap::new();
        for attribute in self.store.variant_attributes(item.product_id)? {
            let values = self.store.attribute_values(attribute.id)?;
            allowed.insert(attribute.id, values.iter().map(|v| v.id).collect());
        }

        let mut filters = Vec::new();
        for (suffix, _) in form.with_prefix(FILTER_KEY_PREFIX) {
            let key = format!("{}{}", FILTER_KEY_PREFIX, suffix);
            let attribute_id: VariantAttributeId = suffix
                .parse()
                .map_err(|_| AdminError::invalid_form(&key, "not an attribute id"))?;
            let Some(values) = allowed.get(&attribute_id) else {
                return Err(AdminError::invalid_form(
                    &key,
                    format!("attribute {} does not belong to product {}", attribute_id, item.product_id),
                ));
            };

            let selected: BTreeSet<AttributeValueId> =
                form.parse_all::<AttributeValueId>(&key)?.into_iter().collect();
            if let Some(unknown) = selected.iter().find(|v| !values.contains(*v)) {
                return Err(AdminError::invalid_form(
                    &key,
                    format!("value {} does not belong to attribute {}", unknown, attribute_id),
                ));
            }

            let preselect_key = format!("{}{}", PRESELECT_KEY_PREFIX, attribute_id);
            let preselected: Option<AttributeValueId> = form.parse(&preselect_key)?;
            if preselected.is_some_and(|p| !selected.contains(&p)) {
                tracing::debug!(%attribute_id, "pre-selected value is not among the filter values");
            }

            filters.extend(selected.into_iter().map(|value_id| {
                ProductBundleItemAttributeFilter::new(
                    item.id,
                    attribute_id,
                    value_id,
                    preselected == Some(value_id),
                )
            }));
        }
        Ok(filters)
    }

    /// Save item settings and replace its filters.
    ///
    /// The form is validated before anything is written. With
    /// `filter_attributes` off the item ends up with no filters.
    pub fn update_item(
        &self,
        id: BundleItemId,
        edit: &BundleItemEdit,
        form: &FormData,
    ) -> Result<BundleItemUpdate> {
        let mut item = self.require_item(id)?;
        edit.validate()?;
        if let Some(BundleItemDiscount::Amount(amount)) = edit.discount {
            let child = self
                .store
                .product(item.product_id)?
                .ok_or_else(|| AdminError::not_found("product", item.product_id.get()))?;
            if amount.currency != child.currency() {
                return Err(AdminError::invalid_form(
                    "discount",
                    format!("must be in {}, got {}", child.currency(), amount.currency),
                ));
            }
        }
        edit.apply_to(&mut item);

        let filters = if item.filter_attributes {
            self.filters_from_form(&item, form)?
        } else {
            Vec::new()
        };

        self.store.update_bundle_item(&item)?;
        let filters = self.store.replace_bundle_item_filters(id, filters)?;
        tracing::debug!(bundle_item_id = %id, filters = filters.len(), "saved bundle item");
        Ok(BundleItemUpdate { item, filters })
    }

    /// Remove an item and its filters.
    pub fn delete_item(&self, id: BundleItemId) -> Result<ProductBundleItem> {
        let item = self.require_item(id)?;
        self.store.delete_bundle_item(id)?;
        tracing::debug!(bundle_item_id = %id, bundle_id = %item.bundle_product_id, "deleted bundle item");
        Ok(item)
    }

    /// Order-time data for the visible, published items of a bundle.
    ///
    /// With per-item pricing each entry carries the tax-adjusted unit price of
    /// its child product at the item's quantity.
    pub fn order_snapshot(&self, bundle_id: ProductId) -> Result<Vec<BundleItemOrderData>> {
        let bundle = self.require_bundle(bundle_id)?;
        let mut snapshot = Vec::new();

        for item in self.store.bundle_items(bundle_id)? {
            if !item.is_active() {
                continue;
            }
            let Some(child) = self.store.product(item.product_id)? else {
                tracing::warn!(bundle_item_id = %item.id, product_id = %item.product_id, "bundle item product missing");
                continue;
            };

            let mut selection = AttributeSelection::new();
            for filter in self.store.bundle_item_filters(item.id)? {
                if filter.is_pre_selected {
                    selection.add_value_id(filter.attribute_id, filter.attribute_value_id);
                }
            }
            let attributes_xml = if selection.is_empty() {
                String::new()
            } else {
                selection.to_xml()?
            };

            let price_with_discount = if bundle.bundle.per_item_pricing {
                let unit = self.prices.final_price(&child, item.quantity, Some(&item))?;
                Some(self.tax.price_with_tax(&child, unit)?)
            } else {
                None
            };

            snapshot.push(BundleItemOrderData {
                bundle_item_id: item.id,
                product_id: child.id,
                sku: child.sku.clone(),
                product_name: item.name.clone().unwrap_or_else(|| child.name.clone()),
                quantity: item.quantity,
                display_order: item.display_order,
                price_with_discount,
                attributes_xml,
                per_item_shopping_cart: bundle.bundle.per_item_shopping_cart,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaxConfig;
    use crate::pricing::{CatalogPriceCalculator, FlatRateTax};
    use crate::store::InMemoryCatalogStore;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn reconciler(store: Arc<InMemoryCatalogStore>, tax_rate: f64) -> BundleReconciler {
        BundleReconciler::new(
            store,
            Arc::new(CatalogPriceCalculator::at(0)),
            Arc::new(FlatRateTax::new(TaxConfig {
                rate_percent: tax_rate,
                ..TaxConfig::default()
            })),
        )
    }

    fn color_attribute(store: &InMemoryCatalogStore, product_id: ProductId) -> (VariantAttributeId, Vec<AttributeValueId>) {
        let attribute = store
            .insert_variant_attribute(ProductVariantAttribute::new(
                product_id,
                ProductAttributeId::new(1),
                "Color",
                AttributeControlType::DropdownList,
            ))
            .unwrap();
        let values = ["Red", "Green", "Blue"]
            .iter()
            .map(|name| {
                store
                    .insert_attribute_value(ProductVariantAttributeValue::new(attribute, *name))
                    .unwrap()
            })
            .collect();
        (attribute, values)
    }

    #[test]
    fn test_add_items_skips_ineligible() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let cap = store.insert_product(Product::new("Cap", usd(500))).unwrap();
        let mut ebook = Product::new("E-book", usd(900));
        ebook.is_download = true;
        let ebook = store.insert_product(ebook).unwrap();
        let other_bundle = store.insert_product(Product::bundle("Other", usd(0))).unwrap();

        let outcome = reconciler(store.clone(), 0.0)
            .add_items(bundle, &[bundle, ebook, ProductId::new(999), other_bundle, cap])
            .unwrap();

        assert_eq!(outcome.inserted.len(), 1);
        assert!(outcome.warnings.is_empty());
        assert!(outcome.close_popup);

        let items = store.bundle_items(bundle).unwrap();
        assert_eq!(items[0].product_id, cap);
        assert_eq!(items[0].display_order, 5);
        assert_eq!(items[0].quantity, 1);
        assert!(items[0].visible && items[0].published);
    }

    #[test]
    fn test_add_items_rejects_product_linkage() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let gift = store.insert_product(Product::new("Gift Box", usd(300))).unwrap();
        let linked = store.insert_product(Product::new("Ribbon", usd(100))).unwrap();
        let attribute = store
            .insert_variant_attribute(ProductVariantAttribute::new(
                gift,
                ProductAttributeId::new(2),
                "Extras",
                AttributeControlType::Checkboxes,
            ))
            .unwrap();
        store
            .insert_attribute_value(ProductVariantAttributeValue::linkage(attribute, "Ribbon", linked))
            .unwrap();

        let outcome = reconciler(store.clone(), 0.0).add_items(bundle, &[gift, linked]).unwrap();
        assert_eq!(outcome.inserted.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(!outcome.close_popup);
        assert!(store.bundle_items(bundle).unwrap().iter().all(|i| i.product_id != gift));
    }

    #[test]
    fn test_add_items_skips_existing_and_repeated_children() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let cap = store.insert_product(Product::new("Cap", usd(500))).unwrap();
        let scarf = store.insert_product(Product::new("Scarf", usd(900))).unwrap();
        let reconciler = reconciler(store.clone(), 0.0);

        reconciler.add_items(bundle, &[cap]).unwrap();
        let second = reconciler.add_items(bundle, &[cap, scarf, cap, scarf]).unwrap();

        assert_eq!(second.inserted.len(), 1);
        assert!(second.close_popup);
        let children: Vec<ProductId> = store
            .bundle_items(bundle)
            .unwrap()
            .iter()
            .map(|i| i.product_id)
            .collect();
        assert_eq!(children, vec![cap, scarf]);
    }

    #[test]
    fn test_add_items_keeps_rows_inserted_before_a_store_error() {
        let seed = InMemoryCatalogStore::new();
        let bundle = seed.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let cap = seed.insert_product(Product::new("Cap", usd(500))).unwrap();
        let scarf = seed.insert_product(Product::new("Scarf", usd(900))).unwrap();
        let mut snapshot = seed.snapshot();
        snapshot.next_id = i64::MAX - 1;
        let store = Arc::new(InMemoryCatalogStore::from_snapshot(snapshot));

        let result = reconciler(store.clone(), 0.0).add_items(bundle, &[cap, scarf]);
        assert!(matches!(result, Err(AdminError::Storage(_))));

        let items = store.bundle_items(bundle).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, cap);
    }

    #[test]
    fn test_add_items_requires_bundle() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let simple = store.insert_product(Product::new("Cap", usd(500))).unwrap();
        assert!(matches!(
            reconciler(store, 0.0).add_items(simple, &[]),
            Err(AdminError::NotABundle(_))
        ));
    }

    #[test]
    fn test_update_item_replaces_filters() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let shirt = store.insert_product(Product::new("Shirt", usd(2000))).unwrap();
        let (color, values) = color_attribute(&store, shirt);
        let reconciler = reconciler(store.clone(), 0.0);
        let item_id = reconciler.add_items(bundle, &[shirt]).unwrap().inserted[0];

        let item = store.bundle_item(item_id).unwrap().unwrap();
        let mut edit = BundleItemEdit::from_item(&item);
        edit.filter_attributes = true;
        edit.quantity = 2;

        let form = FormData::new()
            .with(format!("attribute_filter_{}", color), values[0].to_string())
            .with(format!("attribute_filter_{}", color), format!("{},{}", values[1], values[0]))
            .with(format!("attribute_preselect_{}", color), values[1].to_string());
        let saved = reconciler.update_item(item_id, &edit, &form).unwrap();

        assert_eq!(saved.item.quantity, 2);
        assert_eq!(saved.filters.len(), 2);
        let preselected: Vec<_> = saved.filters.iter().filter(|f| f.is_pre_selected).collect();
        assert_eq!(preselected.len(), 1);
        assert_eq!(preselected[0].attribute_value_id, values[1]);

        edit.filter_attributes = false;
        let cleared = reconciler.update_item(item_id, &edit, &form).unwrap();
        assert!(cleared.filters.is_empty());
        assert!(store.bundle_item_filters(item_id).unwrap().is_empty());
    }

    #[test]
    fn test_foreign_filter_value_is_rejected_before_delete() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let shirt = store.insert_product(Product::new("Shirt", usd(2000))).unwrap();
        let (color, values) = color_attribute(&store, shirt);
        let reconciler = reconciler(store.clone(), 0.0);
        let item_id = reconciler.add_items(bundle, &[shirt]).unwrap().inserted[0];

        let mut edit = BundleItemEdit::from_item(&store.bundle_item(item_id).unwrap().unwrap());
        edit.filter_attributes = true;
        let good = FormData::new().with(format!("attribute_filter_{}", color), values[2].to_string());
        reconciler.update_item(item_id, &edit, &good).unwrap();

        let bad = FormData::new().with(format!("attribute_filter_{}", color), "424242");
        assert!(matches!(
            reconciler.update_item(item_id, &edit, &bad),
            Err(AdminError::InvalidForm { .. })
        ));
        assert_eq!(store.bundle_item_filters(item_id).unwrap().len(), 1);
    }

    #[test]
    fn test_preselect_outside_filter_values_selects_nothing() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let shirt = store.insert_product(Product::new("Shirt", usd(2000))).unwrap();
        let (color, values) = color_attribute(&store, shirt);
        let reconciler = reconciler(store.clone(), 0.0);
        let item_id = reconciler.add_items(bundle, &[shirt]).unwrap().inserted[0];

        let mut edit = BundleItemEdit::from_item(&store.bundle_item(item_id).unwrap().unwrap());
        edit.filter_attributes = true;
        let form = FormData::new()
            .with(format!("attribute_filter_{}", color), format!("{},{}", values[0], values[1]))
            .with(format!("attribute_preselect_{}", color), values[2].to_string());
        let saved = reconciler.update_item(item_id, &edit, &form).unwrap();

        assert_eq!(saved.filters.len(), 2);
        assert!(saved.filters.iter().all(|f| !f.is_pre_selected));
        assert!(store
            .bundle_item_filters(item_id)
            .unwrap()
            .iter()
            .all(|f| !f.is_pre_selected));
    }

    #[test]
    fn test_amount_discount_must_match_child_currency() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let mut kit = Product::bundle("Kit", usd(0));
        kit.bundle.per_item_pricing = true;
        let bundle = store.insert_product(kit).unwrap();
        let cap = store.insert_product(Product::new("Cap", usd(500))).unwrap();
        let reconciler = reconciler(store.clone(), 0.0);
        let item_id = reconciler.add_items(bundle, &[cap]).unwrap().inserted[0];

        let mut edit = BundleItemEdit::from_item(&store.bundle_item(item_id).unwrap().unwrap());
        edit.discount = Some(BundleItemDiscount::Amount(Money::new(100, Currency::EUR)));
        assert!(matches!(
            reconciler.update_item(item_id, &edit, &FormData::new()),
            Err(AdminError::InvalidForm { ref field, .. }) if field == "discount"
        ));
        assert_eq!(store.bundle_item(item_id).unwrap().unwrap().discount, None);

        edit.discount = Some(BundleItemDiscount::Amount(usd(100)));
        reconciler.update_item(item_id, &edit, &FormData::new()).unwrap();
        let snapshot = reconciler.order_snapshot(bundle).unwrap();
        assert_eq!(snapshot[0].price_with_discount, Some(usd(400)));
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let cap = store.insert_product(Product::new("Cap", usd(500))).unwrap();
        let reconciler = reconciler(store.clone(), 0.0);
        let item_id = reconciler.add_items(bundle, &[cap]).unwrap().inserted[0];

        let mut edit = BundleItemEdit::from_item(&store.bundle_item(item_id).unwrap().unwrap());
        edit.quantity = 0;
        assert!(reconciler.update_item(item_id, &edit, &FormData::new()).is_err());
    }

    #[test]
    fn test_snapshot_uses_unit_price_and_skips_hidden() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let mut kit = Product::bundle("Kit", usd(0));
        kit.bundle.per_item_pricing = true;
        let bundle = store.insert_product(kit).unwrap();
        let x = store.insert_product(Product::new("X", usd(1000)).with_sku("X-1")).unwrap();
        let y = store.insert_product(Product::new("Y", usd(400))).unwrap();
        let z = store.insert_product(Product::new("Z", usd(700))).unwrap();

        let reconciler = reconciler(store.clone(), 10.0);
        let ids = reconciler.add_items(bundle, &[y, x, z]).unwrap().inserted;

        let mut x_edit = BundleItemEdit::from_item(&store.bundle_item(ids[1]).unwrap().unwrap());
        x_edit.quantity = 2;
        reconciler.update_item(ids[1], &x_edit, &FormData::new()).unwrap();

        let mut z_edit = BundleItemEdit::from_item(&store.bundle_item(ids[2]).unwrap().unwrap());
        z_edit.published = false;
        reconciler.update_item(ids[2], &z_edit, &FormData::new()).unwrap();

        let snapshot = reconciler.order_snapshot(bundle).unwrap();
        assert_eq!(snapshot.len(), 2);
        let x_row = snapshot.iter().find(|row| row.product_id == x).unwrap();
        assert_eq!(x_row.quantity, 2);
        assert_eq!(x_row.price_with_discount, Some(usd(1100)));
        assert_eq!(x_row.sku.as_deref(), Some("X-1"));
    }

    #[test]
    fn test_delete_item() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let bundle = store.insert_product(Product::bundle("Kit", usd(0))).unwrap();
        let cap = store.insert_product(Product::new("Cap", usd(500))).unwrap();
        let reconciler = reconciler(store.clone(), 0.0);
        let item_id = reconciler.add_items(bundle, &[cap]).unwrap().inserted[0];

        assert_eq!(reconciler.delete_item(item_id).unwrap().product_id, cap);
        assert!(reconciler.list(bundle).unwrap().is_empty());
        assert!(reconciler.delete_item(item_id).is_err());
    }
}
