//! Product commands.

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Serialize;
use storeadmin_catalog::prelude::*;
use storeadmin_core::form::FormData;
use storeadmin_core::store::CatalogStore;
use storeadmin_core::tabs::{ProductEditModel, ProductTab};
use storeadmin_core::AdminError;

use super::{ProductArgs, ProductCommand};
use crate::context::Context;
use crate::output::format_money;

/// Run the product command.
pub async fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ProductCommand::Show { id, model } => show(id, model, ctx).await,
        ProductCommand::ApplyTabs { model, form } => apply_tabs(&model, form.as_deref(), ctx).await,
        ProductCommand::Export {
            ids,
            product_type,
            output,
        } => export(ids, product_type, output.as_deref(), ctx).await,
    }
}

async fn show(id: ProductId, model: bool, ctx: &Context) -> Result<()> {
    let store = ctx.load_store().await?;
    let product = ctx.admin(store.clone()).product(&ctx.principal(), id)?;

    if model {
        let model = ProductEditModel::from_product(&product, &ProductTab::ALL);
        ctx.output.json(&model);
        return Ok(());
    }

    if ctx.output.is_json() {
        ctx.output.json(&product);
        return Ok(());
    }

    ctx.output.header(&format!("Product {}", product.id));
    ctx.output.kv("name", &product.name);
    ctx.output.kv("sku", product.sku.as_deref().unwrap_or("-"));
    ctx.output.kv("type", product.product_type.as_str());
    ctx.output.kv("price", &product.price.display());
    ctx.output.kv(
        "lowest combination price",
        &format_money(product.lowest_attribute_combination_price),
    );
    ctx.output.kv("published", &product.published.to_string());
    ctx.output.kv("slug", &product.seo.slug);

    let attributes = store.variant_attributes(id)?;
    if !attributes.is_empty() {
        ctx.output.header("Attributes");
        for attribute in &attributes {
            let values = store.attribute_values(attribute.id)?;
            let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
            ctx.output.list_item(&format!(
                "{} [{}]: {}",
                attribute.text_prompt,
                attribute.id,
                names.join(", ")
            ));
        }
    }
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(ctx: &Context, path: &str) -> Result<T> {
    let path = ctx.resolve_path(path);
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn apply_tabs(model_path: &str, form_path: Option<&str>, ctx: &Context) -> Result<()> {
    let model: ProductEditModel = read_json(ctx, model_path).await?;
    let form = match form_path {
        Some(path) => read_json::<FormData>(ctx, path).await?,
        None => FormData::new(),
    };

    let store = ctx.load_store().await?;
    let result = ctx
        .admin(store.clone())
        .edit_product(&ctx.principal(), &model, &form);

    match result {
        Ok(product) => {
            ctx.save_store(&store).await?;
            if ctx.output.is_json() {
                ctx.output.json(&product);
            } else {
                let tabs: Vec<&str> = model.tabs().iter().map(|t| t.as_str()).collect();
                ctx.output.success(&format!(
                    "Saved product {} ({})",
                    product.id,
                    tabs.join(", ")
                ));
            }
            Ok(())
        }
        Err(AdminError::Tab(err)) => {
            ctx.save_store(&store).await?;
            ctx.output.warn(&format!(
                "Tabs before '{}' were saved on product {}",
                err.tab, err.product.id
            ));
            Err(AdminError::Tab(err).into())
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Serialize)]
struct ExportRecord {
    exported_at: String,
    requested: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    products: Vec<Product>,
}

async fn export(
    ids: Vec<ProductId>,
    product_type: Option<ProductType>,
    output: Option<&str>,
    ctx: &Context,
) -> Result<()> {
    let store = ctx.load_store().await?;
    let mut ids = if ids.is_empty() { store.product_ids()? } else { ids };
    if let Some(product_type) = product_type {
        let mut matching = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = store.product(id)? {
                if product.product_type == product_type {
                    matching.push(id);
                }
            }
        }
        ids = matching;
    }

    let selection = ctx.admin(store.clone()).export_products(&ctx.principal(), ids)?;
    if let Some(warning) = &selection.warning {
        ctx.output.warn(warning);
    }

    let count = selection.items.len();
    let record = ExportRecord {
        exported_at: Utc::now().to_rfc3339(),
        requested: selection.requested,
        warning: selection.warning,
        products: selection.items,
    };
    let content = serde_json::to_string_pretty(&record)?;

    match output {
        Some(path) => {
            let path = ctx.resolve_path(path);
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ctx.output
                .success(&format!("Exported {} products to {}", count, path.display()));
        }
        None => println!("{}", content),
    }
    Ok(())
}
