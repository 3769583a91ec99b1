//! Catalog persistence.
//!
//! [`CatalogStore`] is the seam between the admin operations and whatever
//! holds the rows. [`InMemoryCatalogStore`] keeps everything behind one
//! `RwLock` and round-trips through a JSON [`CatalogSnapshot`], which is what
//! the CLI reads and writes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storeadmin_catalog::prelude::*;

use crate::error::{AdminError, Result};

/// Storage operations used by the admin services.
///
/// Every method is a single logical write or read. Methods that replace a set
/// of rows (`replace_bundle_item_filters`, `delete_combinations`) must be
/// atomic: readers never observe the intermediate state.
pub trait CatalogStore: Send + Sync {
    fn product(&self, id: ProductId) -> Result<Option<Product>>;
    /// Products in the order of `ids`; unknown ids are skipped.
    fn products(&self, ids: &[ProductId]) -> Result<Vec<Product>>;
    fn product_ids(&self) -> Result<Vec<ProductId>>;
    fn insert_product(&self, product: Product) -> Result<ProductId>;
    fn update_product(&self, product: &Product) -> Result<()>;

    /// Variant attributes of a product, by display order.
    fn variant_attributes(&self, product_id: ProductId) -> Result<Vec<ProductVariantAttribute>>;
    fn insert_variant_attribute(&self, attribute: ProductVariantAttribute) -> Result<VariantAttributeId>;
    /// Values of a variant attribute, by display order.
    fn attribute_values(
        &self,
        variant_attribute_id: VariantAttributeId,
    ) -> Result<Vec<ProductVariantAttributeValue>>;
    fn insert_attribute_value(&self, value: ProductVariantAttributeValue) -> Result<AttributeValueId>;

    fn combinations(&self, product_id: ProductId) -> Result<Vec<ProductVariantAttributeCombination>>;
    fn combination(&self, id: CombinationId) -> Result<Option<ProductVariantAttributeCombination>>;
    fn insert_combination(
        &self,
        combination: ProductVariantAttributeCombination,
    ) -> Result<CombinationId>;
    fn delete_combination(&self, id: CombinationId) -> Result<bool>;
    /// Delete every combination of a product, returning how many were removed.
    fn delete_combinations(&self, product_id: ProductId) -> Result<usize>;

    fn bundle_item(&self, id: BundleItemId) -> Result<Option<ProductBundleItem>>;
    /// Items of a bundle, by display order.
    fn bundle_items(&self, bundle_product_id: ProductId) -> Result<Vec<ProductBundleItem>>;
    fn insert_bundle_item(&self, item: ProductBundleItem) -> Result<BundleItemId>;
    fn update_bundle_item(&self, item: &ProductBundleItem) -> Result<()>;
    /// Delete an item together with its filters.
    fn delete_bundle_item(&self, id: BundleItemId) -> Result<bool>;

    fn bundle_item_filters(
        &self,
        bundle_item_id: BundleItemId,
    ) -> Result<Vec<ProductBundleItemAttributeFilter>>;
    /// Delete all filters of an item and insert `filters` in one step.
    fn replace_bundle_item_filters(
        &self,
        bundle_item_id: BundleItemId,
        filters: Vec<ProductBundleItemAttributeFilter>,
    ) -> Result<Vec<ProductBundleItemAttributeFilter>>;
}

/// Serializable contents of an in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub next_id: i64,
    #[serde(default)]
    pub products: BTreeMap<ProductId, Product>,
    #[serde(default)]
    pub variant_attributes: BTreeMap<VariantAttributeId, ProductVariantAttribute>,
    #[serde(default)]
    pub attribute_values: BTreeMap<AttributeValueId, ProductVariantAttributeValue>,
    #[serde(default)]
    pub combinations: BTreeMap<CombinationId, ProductVariantAttributeCombination>,
    #[serde(default)]
    pub bundle_items: BTreeMap<BundleItemId, ProductBundleItem>,
    #[serde(default)]
    pub bundle_item_filters: BTreeMap<BundleItemFilterId, ProductBundleItemAttributeFilter>,
}

impl CatalogSnapshot {
    fn allocate(&mut self) -> Result<i64> {
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| AdminError::Storage("id sequence exhausted".to_string()))?;
        Ok(self.next_id)
    }

    /// Highest id in use across all tables.
    fn max_id(&self) -> i64 {
        [
            self.products.keys().map(|k| k.get()).max(),
            self.variant_attributes.keys().map(|k| k.get()).max(),
            self.attribute_values.keys().map(|k| k.get()).max(),
            self.combinations.keys().map(|k| k.get()).max(),
            self.bundle_items.keys().map(|k| k.get()).max(),
            self.bundle_item_filters.keys().map(|k| k.get()).max(),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }
}

/// Thread-safe in-memory catalog store.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    data: RwLock<CatalogSnapshot>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, repairing the id sequence if needed.
    pub fn from_snapshot(mut snapshot: CatalogSnapshot) -> Self {
        snapshot.next_id = snapshot.next_id.max(snapshot.max_id());
        Self {
            data: RwLock::new(snapshot),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.data.read().clone()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.data.read())?)
    }
}

fn sorted_by_display_order<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (i32, i64)) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows
}

impl CatalogStore for InMemoryCatalogStore {
    fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.data.read().products.get(&id).cloned())
    }

    fn products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let data = self.data.read();
        Ok(ids
            .iter()
            .filter_map(|id| data.products.get(id).cloned())
            .collect())
    }

    fn product_ids(&self) -> Result<Vec<ProductId>> {
        Ok(self.data.read().products.keys().copied().collect())
    }

    fn insert_product(&self, mut product: Product) -> Result<ProductId> {
        let mut data = self.data.write();
        let id = ProductId::new(data.allocate()?);
        product.id = id;
        data.products.insert(id, product);
        Ok(id)
    }

    fn update_product(&self, product: &Product) -> Result<()> {
        let mut data = self.data.write();
        match data.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(AdminError::not_found("product", product.id.get())),
        }
    }

    fn variant_attributes(&self, product_id: ProductId) -> Result<Vec<ProductVariantAttribute>> {
        let rows = self
            .data
            .read()
            .variant_attributes
            .values()
            .filter(|a| a.product_id == product_id)
            .cloned()
            .collect();
        Ok(sorted_by_display_order(rows, |a| (a.display_order, a.id.get())))
    }

    fn insert_variant_attribute(
        &self,
        mut attribute: ProductVariantAttribute,
    ) -> Result<VariantAttributeId> {
        let mut data = self.data.write();
        if !data.products.contains_key(&attribute.product_id) {
            return Err(AdminError::not_found("product", attribute.product_id.get()));
        }
        let id = VariantAttributeId::new(data.allocate()?);
        attribute.id = id;
        data.variant_attributes.insert(id, attribute);
        Ok(id)
    }

    fn attribute_values(
        &self,
        variant_attribute_id: VariantAttributeId,
    ) -> Result<Vec<ProductVariantAttributeValue>> {
        let rows = self
            .data
            .read()
            .attribute_values
            .values()
            .filter(|v| v.variant_attribute_id == variant_attribute_id)
            .cloned()
            .collect();
        Ok(sorted_by_display_order(rows, |v| (v.display_order, v.id.get())))
    }

    fn insert_attribute_value(
        &self,
        mut value: ProductVariantAttributeValue,
    ) -> Result<AttributeValueId> {
        let mut data = self.data.write();
        if !data.variant_attributes.contains_key(&value.variant_attribute_id) {
            return Err(AdminError::not_found(
                "variant attribute",
                value.variant_attribute_id.get(),
            ));
        }
        let id = AttributeValueId::new(data.allocate()?);
        value.id = id;
        data.attribute_values.insert(id, value);
        Ok(id)
    }

    fn combinations(&self, product_id: ProductId) -> Result<Vec<ProductVariantAttributeCombination>> {
        Ok(self
            .data
            .read()
            .combinations
            .values()
            .filter(|c| c.product_id == product_id)
            .cloned()
            .collect())
    }

    fn combination(&self, id: CombinationId) -> Result<Option<ProductVariantAttributeCombination>> {
        Ok(self.data.read().combinations.get(&id).cloned())
    }

    fn insert_combination(
        &self,
        mut combination: ProductVariantAttributeCombination,
    ) -> Result<CombinationId> {
        let mut data = self.data.write();
        let id = CombinationId::new(data.allocate()?);
        combination.id = id;
        data.combinations.insert(id, combination);
        Ok(id)
    }

    fn delete_combination(&self, id: CombinationId) -> Result<bool> {
        Ok(self.data.write().combinations.remove(&id).is_some())
    }

    fn delete_combinations(&self, product_id: ProductId) -> Result<usize> {
        let mut data = self.data.write();
        let before = data.combinations.len();
        data.combinations.retain(|_, c| c.product_id != product_id);
        Ok(before - data.combinations.len())
    }

    fn bundle_item(&self, id: BundleItemId) -> Result<Option<ProductBundleItem>> {
        Ok(self.data.read().bundle_items.get(&id).cloned())
    }

    fn bundle_items(&self, bundle_product_id: ProductId) -> Result<Vec<ProductBundleItem>> {
        let rows = self
            .data
            .read()
            .bundle_items
            .values()
            .filter(|i| i.bundle_product_id == bundle_product_id)
            .cloned()
            .collect();
        Ok(sorted_by_display_order(rows, |i| (i.display_order, i.id.get())))
    }

    fn insert_bundle_item(&self, mut item: ProductBundleItem) -> Result<BundleItemId> {
        let mut data = self.data.write();
        let id = BundleItemId::new(data.allocate()?);
        item.id = id;
        data.bundle_items.insert(id, item);
        Ok(id)
    }

    fn update_bundle_item(&self, item: &ProductBundleItem) -> Result<()> {
        let mut data = self.data.write();
        match data.bundle_items.get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(AdminError::not_found("bundle item", item.id.get())),
        }
    }

    fn delete_bundle_item(&self, id: BundleItemId) -> Result<bool> {
        let mut data = self.data.write();
        let removed = data.bundle_items.remove(&id).is_some();
        data.bundle_item_filters.retain(|_, f| f.bundle_item_id != id);
        Ok(removed)
    }

    fn bundle_item_filters(
        &self,
        bundle_item_id: BundleItemId,
    ) -> Result<Vec<ProductBundleItemAttributeFilter>> {
        Ok(self
            .data
            .read()
            .bundle_item_filters
            .values()
            .filter(|f| f.bundle_item_id == bundle_item_id)
            .cloned()
            .collect())
    }

    fn replace_bundle_item_filters(
        &self,
        bundle_item_id: BundleItemId,
        filters: Vec<ProductBundleItemAttributeFilter>,
    ) -> Result<Vec<ProductBundleItemAttributeFilter>> {
        let mut data = self.data.write();
        if !data.bundle_items.contains_key(&bundle_item_id) {
            return Err(AdminError::not_found("bundle item", bundle_item_id.get()));
        }

        let ids = filters
            .iter()
            .map(|_| data.allocate().map(BundleItemFilterId::new))
            .collect::<Result<Vec<_>>>()?;

        data.bundle_item_filters
            .retain(|_, f| f.bundle_item_id != bundle_item_id);

        let mut inserted = Vec::with_capacity(filters.len());
        for (id, mut filter) in ids.into_iter().zip(filters) {
            filter.id = id;
            filter.bundle_item_id = bundle_item_id;
            data.bundle_item_filters.insert(filter.id, filter.clone());
            inserted.push(filter);
        }
        Ok(inserted)
    }
}
