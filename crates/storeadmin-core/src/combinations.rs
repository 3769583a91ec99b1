//! Attribute combination management.
//!
//! [`CombinationGenerator::create_all`] enumerates the cartesian product of a
//! product's discrete attribute values and persists every tuple that does not
//! exist yet. Equivalence is decided on decoded [`AttributeSelection`]s, never
//! on raw XML text.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use storeadmin_catalog::prelude::*;

use crate::config::CombinationDefaults;
use crate::error::{AdminError, Result};
use crate::store::CatalogStore;

/// Result of a bulk "create all" run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAllOutcome {
    /// Ids of the combinations inserted by this run.
    pub created: Vec<CombinationId>,
    /// Tuples that already had an equivalent combination.
    pub skipped: usize,
    /// Number of attributes that contributed values.
    pub dimensions: usize,
}

/// Field values for a manually added combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationOverrides {
    pub sku: Option<String>,
    pub gtin: Option<String>,
    pub stock_quantity: i64,
    pub allow_out_of_stock_orders: bool,
    pub price: Option<Money>,
    pub is_active: bool,
}

impl Default for CombinationOverrides {
    fn default() -> Self {
        Self {
            sku: None,
            gtin: None,
            stock_quantity: 0,
            allow_out_of_stock_orders: false,
            price: None,
            is_active: true,
        }
    }
}

/// Result of adding a single combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCombinationOutcome {
    /// Set when the combination was inserted.
    pub combination_id: Option<CombinationId>,
    /// Problems with the submitted selection. Nothing is inserted when present.
    pub warnings: Vec<String>,
}

/// Creates, deletes and lists attribute combinations of products.
pub struct CombinationGenerator {
    store: Arc<dyn CatalogStore>,
    defaults: CombinationDefaults,
}

impl CombinationGenerator {
    pub fn new(store: Arc<dyn CatalogStore>, defaults: CombinationDefaults) -> Self {
        Self { store, defaults }
    }

    fn require_product(&self, product_id: ProductId) -> Result<Product> {
        self.store
            .product(product_id)?
            .ok_or_else(|| AdminError::not_found("product", product_id.get()))
    }

    fn existing_selections(&self, product_id: ProductId) -> Result<HashSet<AttributeSelection>> {
        self.store
            .combinations(product_id)?
            .iter()
            .map(|c| c.selection().map_err(AdminError::from))
            .collect()
    }

    pub fn list(&self, product_id: ProductId) -> Result<Vec<ProductVariantAttributeCombination>> {
        self.require_product(product_id)?;
        self.store.combinations(product_id)
    }

    /// Insert every missing combination of the product's discrete attribute values.
    pub fn create_all(&self, product_id: ProductId) -> Result<CreateAllOutcome> {
        self.require_product(product_id)?;

        let mut dimensions = Vec::new();
        for attribute in self.store.variant_attributes(product_id)? {
            if !attribute.should_have_values() {
                continue;
            }
            let values = self.store.attribute_values(attribute.id)?;
            if values.is_empty() {
                tracing::debug!(
                    %product_id,
                    attribute_id = %attribute.id,
                    "skipping attribute without values"
                );
                continue;
            }
            let value_ids: Vec<AttributeValueId> = values.iter().map(|v| v.id).collect();
            dimensions.push((attribute.id, value_ids));
        }

        let mut outcome = CreateAllOutcome {
            dimensions: dimensions.len(),
            ..Default::default()
        };
        // multi_cartesian_product of zero iterators yields one empty tuple
        if dimensions.is_empty() {
            tracing::info!(%product_id, "no attribute dimensions, nothing to create");
            return Ok(outcome);
        }

        let mut existing = self.existing_selections(product_id)?;
        let tuples = dimensions
            .iter()
            .map(|(_, values)| values.iter().copied())
            .multi_cartesian_product();

        for tuple in tuples {
            let selection = dimensions
                .iter()
                .zip(tuple)
                .fold(AttributeSelection::new(), |selection, ((attribute_id, _), value_id)| {
                    selection.with_value_id(*attribute_id, value_id)
                });

            if existing.contains(&selection) {
                outcome.skipped += 1;
                continue;
            }

            let mut combination = ProductVariantAttributeCombination::new(product_id, &selection)?;
            combination.stock_quantity = self.defaults.stock_quantity;
            combination.is_active = self.defaults.is_active;
            combination.allow_out_of_stock_orders = self.defaults.allow_out_of_stock_orders;

            outcome.created.push(self.store.insert_combination(combination)?);
            existing.insert(selection);
        }

        self.update_lowest_price(product_id)?;
        tracing::info!(
            %product_id,
            dimensions = outcome.dimensions,
            created = outcome.created.len(),
            skipped = outcome.skipped,
            "created attribute combinations"
        );
        Ok(outcome)
    }

    /// Delete every combination of the product.
    pub fn delete_all(&self, product_id: ProductId) -> Result<usize> {
        self.require_product(product_id)?;
        let deleted = self.store.delete_combinations(product_id)?;
        self.update_lowest_price(product_id)?;
        tracing::info!(%product_id, deleted, "deleted attribute combinations");
        Ok(deleted)
    }

    /// Add one combination after checking the selection against the product's attributes.
    pub fn add_combination(
        &self,
        product_id: ProductId,
        selection: &AttributeSelection,
        overrides: CombinationOverrides,
    ) -> Result<AddCombinationOutcome> {
        let product = self.require_product(product_id)?;
        let mut warnings = Vec::new();

        if let Some(price) = overrides.price {
            if price.currency != product.currency() {
                warnings.push(format!(
                    "Price must be in {}, got {}",
                    product.currency(),
                    price.currency
                ));
            }
        }

        let attributes = self.store.variant_attributes(product_id)?;
        let known: HashMap<VariantAttributeId, &ProductVariantAttribute> =
            attributes.iter().map(|a| (a.id, a)).collect();

        for attribute_id in selection.attribute_ids() {
            if !known.contains_key(&attribute_id) {
                warnings.push(format!(
                    "Attribute {} does not belong to product {}",
                    attribute_id, product_id
                ));
            }
        }

        for attribute in &attributes {
            if attribute.is_required && !selection.contains(attribute.id) {
                warnings.push(format!("Please select {}", attribute.text_prompt));
                continue;
            }
            if !attribute.should_have_values() {
                continue;
            }

            let allowed: HashSet<String> = self
                .store
                .attribute_values(attribute.id)?
                .iter()
                .map(|v| v.id.to_string())
                .collect();
            for value in selection.values(attribute.id) {
                if !allowed.contains(value) {
                    warnings.push(format!(
                        "Value '{}' is not an option of {}",
                        value, attribute.text_prompt
                    ));
                }
            }
        }

        if warnings.is_empty() && self.existing_selections(product_id)?.contains(selection) {
            warnings.push("The combination already exists".to_string());
        }

        if !warnings.is_empty() {
            tracing::warn!(%product_id, warnings = warnings.len(), "combination not added");
            return Ok(AddCombinationOutcome {
                combination_id: None,
                warnings,
            });
        }

        let mut combination = ProductVariantAttributeCombination::new(product_id, selection)?;
        combination.sku = overrides.sku;
        combination.gtin = overrides.gtin;
        combination.stock_quantity = overrides.stock_quantity;
        combination.allow_out_of_stock_orders = overrides.allow_out_of_stock_orders;
        combination.price = overrides.price;
        combination.is_active = overrides.is_active;

        let id = self.store.insert_combination(combination)?;
        self.update_lowest_price(product_id)?;
        tracing::debug!(%product_id, combination_id = %id, "added attribute combination");
        Ok(AddCombinationOutcome {
            combination_id: Some(id),
            warnings,
        })
    }

    /// Delete one combination, returning the product it belonged to.
    pub fn delete_combination(&self, id: CombinationId) -> Result<ProductId> {
        let combination = self
            .store
            .combination(id)?
            .ok_or_else(|| AdminError::not_found("combination", id.get()))?;
        self.store.delete_combination(id)?;
        self.update_lowest_price(combination.product_id)?;
        Ok(combination.product_id)
    }

    /// Recompute the product's cached lowest combination price.
    pub fn update_lowest_price(&self, product_id: ProductId) -> Result<Option<Money>> {
        let mut product = self.require_product(product_id)?;

        let mut lowest: Option<Money> = None;
        for price in self
            .store
            .combinations(product_id)?
            .iter()
            .filter_map(|c| c.effective_price_override())
        {
            lowest = match lowest {
                Some(current) if current.try_cmp(&price)?.is_le() => Some(current),
                _ => Some(price),
            };
        }

        if product.lowest_attribute_combination_price != lowest {
            product.lowest_attribute_combination_price = lowest;
            self.store.update_product(&product)?;
        }
        Ok(lowest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCatalogStore;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    struct Fixture {
        store: Arc<InMemoryCatalogStore>,
        generator: CombinationGenerator,
        product_id: ProductId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCatalogStore::new());
        let product_id = store.insert_product(Product::new("Tee", usd(1500))).unwrap();
        let generator = CombinationGenerator::new(store.clone(), CombinationDefaults::default());
        Fixture {
            store,
            generator,
            product_id,
        }
    }

    fn attribute(
        store: &InMemoryCatalogStore,
        product_id: ProductId,
        prompt: &str,
        control: AttributeControlType,
        values: &[&str],
    ) -> (VariantAttributeId, Vec<AttributeValueId>) {
        let id = store
            .insert_variant_attribute(ProductVariantAttribute::new(
                product_id,
                ProductAttributeId::new(1),
                prompt,
                control,
            ))
            .unwrap();
        let values = values
            .iter()
            .map(|name| {
                store
                    .insert_attribute_value(ProductVariantAttributeValue::new(id, *name))
                    .unwrap()
            })
            .collect();
        (id, values)
    }

    #[test]
    fn test_create_all_counts_product_of_dimensions() {
        let f = fixture();
        attribute(&f.store, f.product_id, "Color", AttributeControlType::DropdownList, &["Red", "Blue"]);
        attribute(&f.store, f.product_id, "Size", AttributeControlType::RadioList, &["S", "M", "L"]);
        attribute(&f.store, f.product_id, "Engraving", AttributeControlType::TextBox, &[]);
        attribute(&f.store, f.product_id, "Extras", AttributeControlType::Checkboxes, &[]);

        let outcome = f.generator.create_all(f.product_id).unwrap();
        assert_eq!(outcome.dimensions, 2);
        assert_eq!(outcome.created.len(), 6);

        let rows = f.store.combinations(f.product_id).unwrap();
        assert!(rows.iter().all(|c| c.stock_quantity == 10_000
            && c.is_active
            && c.allow_out_of_stock_orders));

        let again = f.generator.create_all(f.product_id).unwrap();
        assert!(again.created.is_empty());
        assert_eq!(again.skipped, 6);
    }

    #[test]
    fn test_create_all_without_dimensions() {
        let f = fixture();
        attribute(&f.store, f.product_id, "Note", AttributeControlType::MultilineTextbox, &[]);
        let outcome = f.generator.create_all(f.product_id).unwrap();
        assert_eq!(outcome, CreateAllOutcome::default());
        assert!(f.store.combinations(f.product_id).unwrap().is_empty());
    }

    #[test]
    fn test_create_all_skips_existing_equivalent() {
        let f = fixture();
        let (color, colors) =
            attribute(&f.store, f.product_id, "Color", AttributeControlType::DropdownList, &["Red", "Blue"]);

        let selection = AttributeSelection::new().with_value_id(color, colors[1]);
        let added = f
            .generator
            .add_combination(f.product_id, &selection, CombinationOverrides::default())
            .unwrap();
        assert!(added.combination_id.is_some());

        let outcome = f.generator.create_all(f.product_id).unwrap();
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_add_combination_warnings() {
        let f = fixture();
        let (color, colors) =
            attribute(&f.store, f.product_id, "Color", AttributeControlType::DropdownList, &["Red"]);
        attribute(&f.store, f.product_id, "Size", AttributeControlType::DropdownList, &["S"]);

        let selection = AttributeSelection::new()
            .with_value_id(color, colors[0])
            .with_value_id(color, AttributeValueId::new(999));
        let outcome = f
            .generator
            .add_combination(f.product_id, &selection, CombinationOverrides::default())
            .unwrap();

        assert_eq!(outcome.combination_id, None);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings.iter().any(|w| w.contains("Size")));
        assert!(outcome.warnings.iter().any(|w| w.contains("999")));
        assert!(f.store.combinations(f.product_id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_add_is_a_warning() {
        let f = fixture();
        let (color, colors) =
            attribute(&f.store, f.product_id, "Color", AttributeControlType::DropdownList, &["Red"]);
        let selection = AttributeSelection::new().with_value_id(color, colors[0]);

        f.generator
            .add_combination(f.product_id, &selection, CombinationOverrides::default())
            .unwrap();
        let second = f
            .generator
            .add_combination(f.product_id, &selection, CombinationOverrides::default())
            .unwrap();
        assert_eq!(second.warnings, vec!["The combination already exists".to_string()]);
    }

    #[test]
    fn test_lowest_price_follows_active_overrides() {
        let f = fixture();
        let (color, colors) = attribute(
            &f.store,
            f.product_id,
            "Color",
            AttributeControlType::ColorSquares,
            &["Red", "Blue", "Green"],
        );

        let add = |value: AttributeValueId, price: i64, is_active: bool| {
            f.generator
                .add_combination(
                    f.product_id,
                    &AttributeSelection::new().with_value_id(color, value),
                    CombinationOverrides {
                        price: Some(usd(price)),
                        is_active,
                        ..Default::default()
                    },
                )
                .unwrap()
                .combination_id
                .unwrap()
        };

        add(colors[0], 1800, true);
        let cheapest = add(colors[1], 1200, true);
        add(colors[2], 900, false);

        let product = f.store.product(f.product_id).unwrap().unwrap();
        assert_eq!(product.lowest_attribute_combination_price, Some(usd(1200)));

        f.generator.delete_combination(cheapest).unwrap();
        let product = f.store.product(f.product_id).unwrap().unwrap();
        assert_eq!(product.lowest_attribute_combination_price, Some(usd(1800)));

        f.generator.delete_all(f.product_id).unwrap();
        let product = f.store.product(f.product_id).unwrap().unwrap();
        assert_eq!(product.lowest_attribute_combination_price, None);
    }

    #[test]
    fn test_foreign_currency_price_is_a_warning() {
        let f = fixture();
        let (color, colors) =
            attribute(&f.store, f.product_id, "Color", AttributeControlType::DropdownList, &["Red", "Blue"]);

        let eur = f
            .generator
            .add_combination(
                f.product_id,
                &AttributeSelection::new().with_value_id(color, colors[0]),
                CombinationOverrides {
                    price: Some(Money::new(1000, Currency::EUR)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(eur.combination_id, None);
        assert_eq!(eur.warnings, vec!["Price must be in USD, got EUR".to_string()]);
        assert!(f.store.combinations(f.product_id).unwrap().is_empty());

        let dollars = f
            .generator
            .add_combination(
                f.product_id,
                &AttributeSelection::new().with_value_id(color, colors[1]),
                CombinationOverrides {
                    price: Some(usd(1100)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(dollars.combination_id.is_some());
        assert_eq!(f.generator.update_lowest_price(f.product_id).unwrap(), Some(usd(1100)));
        assert_eq!(f.generator.create_all(f.product_id).unwrap().created.len(), 1);
    }

    #[test]
    fn test_delete_missing_combination() {
        let f = fixture();
        assert!(matches!(
            f.generator.delete_combination(CombinationId::new(42)),
            Err(AdminError::NotFound { entity: "combination", .. })
        ));
    }
}
