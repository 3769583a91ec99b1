//! Bundle item commands.

use anyhow::{Context as _, Result};
use chrono::Utc;
use dialoguer::Confirm;
use storeadmin_catalog::prelude::*;
use storeadmin_core::bundle::{BundleItemEdit, FILTER_KEY_PREFIX, PRESELECT_KEY_PREFIX};
use storeadmin_core::form::FormData;
use storeadmin_core::store::CatalogStore;

use super::{BundleArgs, BundleCommand};
use crate::context::Context;
use crate::output::format_money;

/// Run the bundle command.
pub async fn run(args: BundleArgs, ctx: &Context) -> Result<()> {
    match args.command {
        BundleCommand::Add { bundle, products } => add(bundle, &products, ctx).await,
        BundleCommand::List { bundle } => list(bundle, ctx).await,
        BundleCommand::Update {
            item,
            quantity,
            discount_percent,
            discount_amount,
            no_discount,
            name,
            visible,
            published,
            display_order,
            filter_attributes,
            filters,
            preselects,
            form,
        } => {
            let mut form_data = match form {
                Some(path) => read_form(&ctx.resolve_path(&path).to_string_lossy()).await?,
                None => FormData::new(),
            };
            for (attribute, values) in filters {
                form_data.insert(format!("{}{}", FILTER_KEY_PREFIX, attribute), values);
            }
            for (attribute, value) in preselects {
                form_data.insert(format!("{}{}", PRESELECT_KEY_PREFIX, attribute), value);
            }

            let changes = ItemChanges {
                quantity,
                discount: if no_discount {
                    Some(None)
                } else {
                    discount_percent.map(|percent| Some(BundleItemDiscount::Percentage(percent)))
                },
                discount_amount,
                name,
                visible,
                published,
                display_order,
                filter_attributes,
            };
            update(item, changes, form_data, ctx).await
        }
        BundleCommand::Delete { item, yes } => delete(item, yes, ctx).await,
        BundleCommand::Snapshot { bundle } => snapshot(bundle, ctx).await,
    }
}

/// Settings given on the command line; `None` keeps the stored value.
struct ItemChanges {
    quantity: Option<u32>,
    discount: Option<Option<BundleItemDiscount>>,
    /// Fixed discount, priced in the child product's currency.
    discount_amount: Option<f64>,
    name: Option<String>,
    visible: Option<bool>,
    published: Option<bool>,
    display_order: Option<i32>,
    filter_attributes: Option<bool>,
}

impl ItemChanges {
    fn apply(self, edit: &mut BundleItemEdit, currency: Currency) {
        if let Some(quantity) = self.quantity {
            edit.quantity = quantity;
        }
        if let Some(discount) = self.discount {
            edit.discount = discount;
        }
        if let Some(amount) = self.discount_amount {
            edit.discount = Some(BundleItemDiscount::Amount(Money::from_decimal(amount, currency)));
        }
        if let Some(name) = self.name {
            edit.name = Some(name);
        }
        if let Some(visible) = self.visible {
            edit.visible = visible;
        }
        if let Some(published) = self.published {
            edit.published = published;
        }
        if let Some(display_order) = self.display_order {
            edit.display_order = display_order;
        }
        if let Some(filter_attributes) = self.filter_attributes {
            edit.filter_attributes = filter_attributes;
        }
    }
}

async fn read_form(path: &str) -> Result<FormData> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read form file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse form file: {}", path))
}

async fn add(bundle: ProductId, products: &[ProductId], ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let outcome = ctx
        .admin(store.clone())
        .add_bundle_items(&ctx.principal(), bundle, products)?;

    if !outcome.inserted.is_empty() {
        ctx.save_store(&store).await?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&outcome);
        return Ok(());
    }

    for warning in &outcome.warnings {
        ctx.output.warn(warning);
    }
    let skipped = products
        .len()
        .saturating_sub(outcome.inserted.len() + outcome.warnings.len());
    if skipped > 0 {
        ctx.output
            .info(&format!("Skipped {} products that cannot be bundle items", skipped));
    }
    ctx.output.success(&format!(
        "Added {} items to bundle {}",
        outcome.inserted.len(),
        bundle
    ));
    Ok(())
}

async fn list(bundle: ProductId, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let admin = ctx.admin(store.clone());
    let principal = ctx.principal();
    let items = admin.list_bundle_items(&principal, bundle)?;

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return Ok(());
    }

    ctx.output.header(&format!("Bundle {}", bundle));
    if items.is_empty() {
        ctx.output.info("No bundle items");
        return Ok(());
    }

    let widths = [6, 30, 5, 8, 10];
    ctx.output
        .table_row(&["ID", "PRODUCT", "QTY", "ORDER", "FILTERS"], &widths);
    for item in &items {
        let name = match &item.name {
            Some(name) => name.clone(),
            None => store
                .product(item.product_id)?
                .map(|p| p.name)
                .unwrap_or_else(|| format!("#{}", item.product_id)),
        };
        let filters = admin.bundle_item_filters(&principal, item.id)?;
        let id = item.id.to_string();
        let quantity = item.quantity.to_string();
        let order = item.display_order.to_string();
        let filter_count = if item.filter_attributes {
            filters.len().to_string()
        } else {
            "off".to_string()
        };
        ctx.output.table_row(
            &[
                id.as_str(),
                name.as_str(),
                quantity.as_str(),
                order.as_str(),
                filter_count.as_str(),
            ],
            &widths,
        );
    }
    Ok(())
}

async fn update(item: BundleItemId, changes: ItemChanges, form: FormData, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let current = store
        .bundle_item(item)?
        .with_context(|| format!("Bundle item {} not found", item))?;

    let currency = store
        .product(current.product_id)?
        .with_context(|| format!("Product {} not found", current.product_id))?
        .currency();

    let mut edit = BundleItemEdit::from_item(&current);
    changes.apply(&mut edit, currency);

    let update = ctx
        .admin(store.clone())
        .update_bundle_item(&ctx.principal(), item, &edit, &form)?;
    ctx.save_store(&store).await?;

    if ctx.output.is_json() {
        ctx.output.json(&update);
        return Ok(());
    }

    ctx.output.success(&format!(
        "Saved bundle item {} with {} attribute filters",
        item,
        update.filters.len()
    ));
    Ok(())
}

async fn delete(item: BundleItemId, yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete bundle item {}?", item))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    let store = ctx.load_store().await?;
    let removed = ctx
        .admin(store.clone())
        .delete_bundle_item(&ctx.principal(), item)?;
    ctx.save_store(&store).await?;
    ctx.output.success(&format!(
        "Removed item {} from bundle {}",
        removed.id, removed.bundle_product_id
    ));
    Ok(())
}

#[derive(serde::Serialize)]
struct SnapshotRecord {
    bundle_product_id: ProductId,
    taken_at: String,
    items: Vec<BundleItemOrderData>,
}

async fn snapshot(bundle: ProductId, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let items = ctx
        .admin(store.clone())
        .bundle_snapshot(&ctx.principal(), bundle)?;

    if ctx.output.is_json() {
        ctx.output.json(&SnapshotRecord {
            bundle_product_id: bundle,
            taken_at: Utc::now().to_rfc3339(),
            items,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Order snapshot of bundle {}", bundle));
    let widths = [30, 12, 5, 10];
    ctx.output.table_row(&["PRODUCT", "SKU", "QTY", "UNIT PRICE"], &widths);
    for row in &items {
        let quantity = row.quantity.to_string();
        let price = format_money(row.price_with_discount);
        ctx.output.table_row(
            &[
                row.product_name.as_str(),
                row.sku.as_deref().unwrap_or("-"),
                quantity.as_str(),
                price.as_str(),
            ],
            &widths,
        );
    }
    Ok(())
}
