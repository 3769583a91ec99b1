//! Catalog admin facade.
//!
//! [`CatalogAdmin`] is the entry point the CLI (or any other front end) uses.
//! Every public method names its [`Operation`], checks it against the
//! configured [`PermissionPolicy`](crate::permissions::PermissionPolicy) and
//! then delegates to the component owning the behaviour.

use std::sync::Arc;
use storeadmin_catalog::prelude::*;

use crate::batch::{limit_batch, BatchSelection};
use crate::bundle::{AddItemsOutcome, BundleItemEdit, BundleItemUpdate, BundleReconciler};
use crate::combinations::{
    AddCombinationOutcome, CombinationGenerator, CombinationOverrides, CreateAllOutcome,
};
use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::events::{AdminEvent, EventPublisher};
use crate::form::FormData;
use crate::permissions::{Operation, Principal};
use crate::pricing::{CatalogPriceCalculator, FlatRateTax, PriceCalculator, TaxCalculator};
use crate::store::CatalogStore;
use crate::tabs::{ProductEditModel, ProductFormMapper};

/// Permission-checked admin operations over a catalog store.
pub struct CatalogAdmin {
    store: Arc<dyn CatalogStore>,
    config: AdminConfig,
    publisher: Arc<dyn EventPublisher>,
    combinations: CombinationGenerator,
    bundles: BundleReconciler,
    mapper: ProductFormMapper,
}

impl CatalogAdmin {
    /// Build the facade with the catalog price calculator and flat-rate tax
    /// from `config`.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        config: AdminConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let tax = Arc::new(FlatRateTax::new(config.tax.clone()));
        Self::with_pricing(store, config, publisher, Arc::new(CatalogPriceCalculator::new()), tax)
    }

    pub fn with_pricing(
        store: Arc<dyn CatalogStore>,
        config: AdminConfig,
        publisher: Arc<dyn EventPublisher>,
        prices: Arc<dyn PriceCalculator>,
        tax: Arc<dyn TaxCalculator>,
    ) -> Self {
        Self {
            combinations: CombinationGenerator::new(store.clone(), config.combinations.clone()),
            bundles: BundleReconciler::new(store.clone(), prices, tax),
            mapper: ProductFormMapper::new(),
            store,
            config,
            publisher,
        }
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    fn authorize(&self, principal: &Principal, operation: Operation) -> Result<()> {
        self.config.permissions.authorize(principal, operation)?;
        tracing::debug!(principal = %principal.name, %operation, "authorized");
        Ok(())
    }

    pub fn product(&self, principal: &Principal, id: ProductId) -> Result<Product> {
        self.authorize(principal, Operation::ViewProduct)?;
        self.store
            .product(id)?
            .ok_or_else(|| AdminError::not_found("product", id.get()))
    }

    /// Apply a posted edit model and save the product.
    ///
    /// When a tab fails, the product as left by the earlier tabs is still
    /// saved and the error is [`AdminError::Tab`]. [`AdminEvent::ProductEdited`]
    /// is published only once a fully applied product has been saved.
    pub fn edit_product(
        &self,
        principal: &Principal,
        model: &ProductEditModel,
        form: &FormData,
    ) -> Result<Product> {
        self.authorize(principal, Operation::EditProduct)?;
        let product = self
            .store
            .product(model.id)?
            .ok_or_else(|| AdminError::not_found("product", model.id.get()))?;

        match self.mapper.apply(model, product) {
            Ok(product) => {
                self.store.update_product(&product)?;
                self.publisher.publish(AdminEvent::ProductEdited {
                    model: Box::new(model.clone()),
                    product: Box::new(product.clone()),
                    form: form.clone(),
                });
                Ok(product)
            }
            Err(err) => {
                self.store.update_product(&err.product)?;
                Err(err.into())
            }
        }
    }

    /// Products for an export or print run, limited to the configured batch size.
    pub fn export_products(
        &self,
        principal: &Principal,
        ids: Vec<ProductId>,
    ) -> Result<BatchSelection<Product>> {
        self.authorize(principal, Operation::ExportProducts)?;
        let selection = limit_batch(ids, &self.config.batch);
        Ok(BatchSelection {
            items: self.store.products(&selection.items)?,
            requested: selection.requested,
            warning: selection.warning,
        })
    }

    pub fn list_combinations(
        &self,
        principal: &Principal,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariantAttributeCombination>> {
        self.authorize(principal, Operation::ListCombinations)?;
        self.combinations.list(product_id)
    }

    pub fn add_combination(
        &self,
        principal: &Principal,
        product_id: ProductId,
        selection: &AttributeSelection,
        overrides: CombinationOverrides,
    ) -> Result<AddCombinationOutcome> {
        self.authorize(principal, Operation::AddCombination)?;
        let outcome = self.combinations.add_combination(product_id, selection, overrides)?;
        if outcome.combination_id.is_some() {
            self.publisher.publish(AdminEvent::CombinationsCreated {
                product_id,
                created: 1,
            });
        }
        Ok(outcome)
    }

    pub fn delete_combination(&self, principal: &Principal, id: CombinationId) -> Result<()> {
        self.authorize(principal, Operation::DeleteCombination)?;
        let product_id = self.combinations.delete_combination(id)?;
        self.publisher.publish(AdminEvent::CombinationsDeleted {
            product_id,
            deleted: 1,
        });
        Ok(())
    }

    pub fn create_all_combinations(
        &self,
        principal: &Principal,
        product_id: ProductId,
    ) -> Result<CreateAllOutcome> {
        self.authorize(principal, Operation::CreateAllCombinations)?;
        let outcome = self.combinations.create_all(product_id)?;
        self.publisher.publish(AdminEvent::CombinationsCreated {
            product_id,
            created: outcome.created.len(),
        });
        Ok(outcome)
    }

    pub fn delete_all_combinations(&self, principal: &Principal, product_id: ProductId) -> Result<usize> {
        self.authorize(principal, Operation::DeleteAllCombinations)?;
        let deleted = self.combinations.delete_all(product_id)?;
        self.publisher.publish(AdminEvent::CombinationsDeleted { product_id, deleted });
        Ok(deleted)
    }

    pub fn list_bundle_items(
        &self,
        principal: &Principal,
        bundle_id: ProductId,
    ) -> Result<Vec<ProductBundleItem>> {
        self.authorize(principal, Operation::ListBundleItems)?;
        self.bundles.list(bundle_id)
    }

    pub fn bundle_item_filters(
        &self,
        principal: &Principal,
        item_id: BundleItemId,
    ) -> Result<Vec<ProductBundleItemAttributeFilter>> {
        self.authorize(principal, Operation::ListBundleItems)?;
        self.bundles.filters(item_id)
    }

    pub fn add_bundle_items(
        &self,
        principal: &Principal,
        bundle_id: ProductId,
        candidates: &[ProductId],
    ) -> Result<AddItemsOutcome> {
        self.authorize(principal, Operation::AddBundleItems)?;
        let outcome = self.bundles.add_items(bundle_id, candidates)?;
        if !outcome.inserted.is_empty() {
            self.publisher.publish(AdminEvent::BundleItemsAdded {
                bundle_product_id: bundle_id,
                item_ids: outcome.inserted.clone(),
            });
        }
        Ok(outcome)
    }

    pub fn update_bundle_item(
        &self,
        principal: &Principal,
        id: BundleItemId,
        edit: &BundleItemEdit,
        form: &FormData,
    ) -> Result<BundleItemUpdate> {
        self.authorize(principal, Operation::UpdateBundleItem)?;
        let update = self.bundles.update_item(id, edit, form)?;
        self.publisher.publish(AdminEvent::BundleItemUpdated {
            bundle_item_id: id,
            filters: update.filters.len(),
        });
        Ok(update)
    }

    pub fn delete_bundle_item(&self, principal: &Principal, id: BundleItemId) -> Result<ProductBundleItem> {
        self.authorize(principal, Operation::DeleteBundleItem)?;
        self.bundles.delete_item(id)
    }

    pub fn bundle_snapshot(
        &self,
        principal: &Principal,
        bundle_id: ProductId,
    ) -> Result<Vec<BundleItemOrderData>> {
        self.authorize(principal, Operation::SnapshotBundle)?;
        self.bundles.order_snapshot(bundle_id)
    }
}
