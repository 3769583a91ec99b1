//! Attribute combination commands.

use anyhow::Result;
use dialoguer::Confirm;
use storeadmin_catalog::prelude::*;
use storeadmin_core::combinations::CombinationOverrides;
use storeadmin_core::store::CatalogStore;

use super::{CombinationsArgs, CombinationsCommand};
use crate::context::Context;
use crate::output::{active_badge, format_money};

/// Run the combinations command.
pub async fn run(args: CombinationsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CombinationsCommand::CreateAll { product } => create_all(product, ctx).await,
        CombinationsCommand::DeleteAll { product, yes } => delete_all(product, yes, ctx).await,
        CombinationsCommand::List { product } => list(product, ctx).await,
        CombinationsCommand::Add {
            product,
            attributes,
            sku,
            gtin,
            stock,
            price,
            allow_out_of_stock,
            inactive,
        } => {
            let overrides = CombinationOverrides {
                sku,
                gtin,
                stock_quantity: stock,
                allow_out_of_stock_orders: allow_out_of_stock,
                price: None,
                is_active: !inactive,
            };
            add(product, attributes, price, overrides, ctx).await
        }
        CombinationsCommand::Delete { id } => delete(id, ctx).await,
    }
}

async fn create_all(product: ProductId, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let admin = ctx.admin(store.clone());

    let spinner = ctx.output.spinner(&format!("Generating combinations for product {}", product));
    let outcome = admin.create_all_combinations(&ctx.principal(), product);
    spinner.finish_and_clear();
    let outcome = outcome?;

    ctx.save_store(&store).await?;

    if ctx.output.is_json() {
        ctx.output.json(&outcome);
        return Ok(());
    }

    if outcome.dimensions == 0 {
        ctx.output
            .warn("Product has no attributes with values; no combinations created");
        return Ok(());
    }
    ctx.output.success(&format!(
        "Created {} combinations ({} already existed)",
        outcome.created.len(),
        outcome.skipped
    ));
    Ok(())
}

async fn delete_all(product: ProductId, yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all combinations of product {}?", product))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    let store = ctx.load_store().await?;
    let deleted = ctx
        .admin(store.clone())
        .delete_all_combinations(&ctx.principal(), product)?;
    ctx.save_store(&store).await?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "product_id": product, "deleted": deleted }));
    } else {
        ctx.output
            .success(&format!("Deleted {} combinations of product {}", deleted, product));
    }
    Ok(())
}

async fn list(product: ProductId, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let combinations = ctx
        .admin(store.clone())
        .list_combinations(&ctx.principal(), product)?;

    if ctx.output.is_json() {
        ctx.output.json(&combinations);
        return Ok(());
    }

    ctx.output.header(&format!("Combinations of product {}", product));
    if combinations.is_empty() {
        ctx.output.info("No combinations");
        return Ok(());
    }

    let attributes = store.variant_attributes(product)?;
    let widths = [6, 40, 12, 8, 10, 8];
    ctx.output
        .table_row(&["ID", "ATTRIBUTES", "SKU", "STOCK", "PRICE", "STATUS"], &widths);
    for combination in &combinations {
        let id = combination.id.to_string();
        let described = describe(combination, &attributes, store.as_ref())?;
        let stock = combination.stock_quantity.to_string();
        let price = format_money(combination.price);
        let status = active_badge(combination.is_active);
        ctx.output.table_row(
            &[
                id.as_str(),
                described.as_str(),
                combination.sku.as_deref().unwrap_or("-"),
                stock.as_str(),
                price.as_str(),
                status.as_str(),
            ],
            &widths,
        );
    }

    if let Some(product) = store.product(product)? {
        ctx.output.kv(
            "lowest combination price",
            &format_money(product.lowest_attribute_combination_price),
        );
        if !product.inventory.tracks_combinations() {
            ctx.output
                .info("Stock is not managed by attributes; STOCK values are ignored");
        }
    }
    Ok(())
}

/// Render a combination as `Color: Red, Size: M`.
fn describe(
    combination: &ProductVariantAttributeCombination,
    attributes: &[ProductVariantAttribute],
    store: &dyn CatalogStore,
) -> Result<String> {
    let selection = combination.selection()?;
    let mut parts = Vec::new();
    for attribute in attributes {
        if !selection.contains(attribute.id) {
            continue;
        }
        let values = store.attribute_values(attribute.id)?;
        let names: Vec<String> = selection
            .values(attribute.id)
            .map(|raw| {
                values
                    .iter()
                    .find(|v| v.id.to_string() == raw)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| raw.to_string())
            })
            .collect();
        parts.push(format!("{}: {}", attribute.text_prompt, names.join("/")));
    }
    Ok(parts.join(", "))
}

async fn add(
    product: ProductId,
    attributes: Vec<(VariantAttributeId, String)>,
    price: Option<f64>,
    mut overrides: CombinationOverrides,
    ctx: &Context,
) -> Result<()> {
    let mut selection = AttributeSelection::new();
    for (attribute, value) in attributes {
        selection.add_value(attribute, value);
    }

    let store = ctx.load_store().await?;
    let admin = ctx.admin(store.clone());
    let principal = ctx.principal();
    if let Some(price) = price {
        let currency = admin.product(&principal, product)?.currency();
        overrides.price = Some(Money::from_decimal(price, currency));
    }
    let outcome = admin.add_combination(&principal, product, &selection, overrides)?;

    if outcome.combination_id.is_some() {
        ctx.save_store(&store).await?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&outcome);
        return Ok(());
    }

    for warning in &outcome.warnings {
        ctx.output.warn(warning);
    }
    if let Some(id) = outcome.combination_id {
        ctx.output.success(&format!("Added combination {}", id));
    }
    Ok(())
}

async fn delete(id: CombinationId, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    ctx.admin(store.clone()).delete_combination(&ctx.principal(), id)?;
    ctx.save_store(&store).await?;
    ctx.output.success(&format!("Deleted combination {}", id));
    Ok(())
}
