//! Configuration management commands.

use anyhow::{bail, Result};
use storeadmin_core::permissions::Operation;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    let config = &ctx.config;
    ctx.output.header("Current Configuration");
    ctx.output.kv("catalog", &ctx.catalog_path.display().to_string());

    ctx.output.info("[principal]");
    ctx.output.kv("name", &config.principal.name);
    let roles: Vec<&str> = config.principal.roles.iter().map(|r| r.as_str()).collect();
    ctx.output.kv("roles", &roles.join(", "));

    ctx.output.info("[admin]");
    ctx.output.kv("currency", config.admin.currency.code());
    let batch = if config.admin.batch.max_items == 0 {
        "unlimited".to_string()
    } else {
        config.admin.batch.max_items.to_string()
    };
    ctx.output.kv("batch.max_items", &batch);
    ctx.output.kv(
        "combinations.stock_quantity",
        &config.admin.combinations.stock_quantity.to_string(),
    );
    ctx.output
        .kv("tax.rate_percent", &config.admin.tax.rate_percent.to_string());
    ctx.output.kv(
        "tax.prices_include_tax",
        &config.admin.tax.prices_include_tax.to_string(),
    );
    ctx.output.kv(
        "tax.display_prices_with_tax",
        &config.admin.tax.display_prices_with_tax.to_string(),
    );

    ctx.output.header("Operations");
    let principal = ctx.principal();
    for operation in Operation::ALL {
        let permission = config.admin.permissions.required(operation);
        let allowed = if principal.has_permission(permission) {
            "allowed"
        } else {
            "denied"
        };
        ctx.output.table_row(
            &[operation.as_str(), permission.as_str(), allowed],
            &[26, 20, 8],
        );
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("storeadmin.toml");

    if tokio::fs::try_exists(&config_path).await.unwrap_or(false) && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = generate_default_config(&ctx.config.principal.name);
    tokio::fs::write(&config_path, content).await?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}
