//! CLI command implementations.

pub mod bundle;
pub mod combinations;
pub mod config;
pub mod product;

use clap::{Args, Subcommand};
use storeadmin_catalog::catalog::ProductType;
use storeadmin_catalog::{BundleItemId, CombinationId, ProductId, VariantAttributeId};

/// Parse `ATTRIBUTE=VALUE` pairs used by selection and filter flags.
pub fn parse_attribute_pair(s: &str) -> Result<(VariantAttributeId, String), String> {
    let (attribute, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ATTRIBUTE=VALUE, got '{}'", s))?;
    let attribute = attribute.parse().map_err(|e| format!("{}", e))?;
    Ok((attribute, value.trim().to_string()))
}

/// Arguments for the combinations command.
#[derive(Args)]
pub struct CombinationsArgs {
    #[command(subcommand)]
    pub command: CombinationsCommand,
}

#[derive(Subcommand)]
pub enum CombinationsCommand {
    /// Create every missing combination of a product's attribute values.
    CreateAll {
        /// Product id.
        product: ProductId,
    },
    /// Delete all combinations of a product.
    DeleteAll {
        /// Product id.
        product: ProductId,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// List combinations of a product.
    List {
        /// Product id.
        product: ProductId,
    },
    /// Add a single combination.
    Add {
        /// Product id.
        product: ProductId,
        /// Selected value as ATTRIBUTE=VALUE (repeatable).
        #[arg(short = 'a', long = "attribute", value_parser = parse_attribute_pair)]
        attributes: Vec<(VariantAttributeId, String)>,
        /// SKU override.
        #[arg(long)]
        sku: Option<String>,
        /// GTIN override.
        #[arg(long)]
        gtin: Option<String>,
        /// Stock quantity.
        #[arg(long, default_value = "0")]
        stock: i64,
        /// Price override in store currency.
        #[arg(long)]
        price: Option<f64>,
        /// Allow orders when out of stock.
        #[arg(long)]
        allow_out_of_stock: bool,
        /// Create the combination inactive.
        #[arg(long)]
        inactive: bool,
    },
    /// Delete one combination.
    Delete {
        /// Combination id.
        id: CombinationId,
    },
}

/// Arguments for the bundle command.
#[derive(Args)]
pub struct BundleArgs {
    #[command(subcommand)]
    pub command: BundleCommand,
}

#[derive(Subcommand)]
pub enum BundleCommand {
    /// Add products to a bundle.
    Add {
        /// Bundle product id.
        bundle: ProductId,
        /// Products to add, in display order.
        #[arg(required = true)]
        products: Vec<ProductId>,
    },
    /// List bundle items.
    List {
        /// Bundle product id.
        bundle: ProductId,
    },
    /// Update a bundle item and replace its attribute filters.
    Update {
        /// Bundle item id.
        item: BundleItemId,
        #[arg(long)]
        quantity: Option<u32>,
        /// Percentage discount on the item price.
        #[arg(long, conflicts_with = "discount_amount")]
        discount_percent: Option<f64>,
        /// Fixed discount on the item price, in store currency.
        #[arg(long)]
        discount_amount: Option<f64>,
        /// Remove any discount.
        #[arg(long, conflicts_with_all = ["discount_percent", "discount_amount"])]
        no_discount: bool,
        /// Name override.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        visible: Option<bool>,
        #[arg(long)]
        published: Option<bool>,
        #[arg(long)]
        display_order: Option<i32>,
        /// Restrict attribute values to the given filters.
        #[arg(long)]
        filter_attributes: Option<bool>,
        /// Allowed values as ATTRIBUTE=ID[,ID...] (repeatable).
        #[arg(long = "filter", value_parser = parse_attribute_pair)]
        filters: Vec<(VariantAttributeId, String)>,
        /// Pre-selected value as ATTRIBUTE=ID (repeatable).
        #[arg(long = "preselect", value_parser = parse_attribute_pair)]
        preselects: Vec<(VariantAttributeId, String)>,
        /// JSON file with raw form fields.
        #[arg(long)]
        form: Option<String>,
    },
    /// Delete a bundle item.
    Delete {
        /// Bundle item id.
        item: BundleItemId,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the order-time snapshot of a bundle.
    Snapshot {
        /// Bundle product id.
        bundle: ProductId,
    },
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Subcommand)]
pub enum ProductCommand {
    /// Show a product.
    Show {
        /// Product id.
        id: ProductId,
        /// Print the prefilled edit model instead.
        #[arg(long)]
        model: bool,
    },
    /// Apply a product edit model.
    ApplyTabs {
        /// JSON file with the edit model.
        model: String,
        /// JSON file with the raw posted form.
        #[arg(long)]
        form: Option<String>,
    },
    /// Export products as JSON.
    Export {
        /// Product ids (default: all).
        ids: Vec<ProductId>,
        /// Only export products of this type (simple, grouped, bundle).
        #[arg(long = "type")]
        product_type: Option<ProductType>,
        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute_pair() {
        let (attribute, value) = parse_attribute_pair("12= 7,8").unwrap();
        assert_eq!(attribute, VariantAttributeId::new(12));
        assert_eq!(value, "7,8");
        assert!(parse_attribute_pair("12").is_err());
        assert!(parse_attribute_pair("x=1").is_err());
    }

    #[derive(clap::Parser)]
    struct ProductCli {
        #[command(subcommand)]
        command: ProductCommand,
    }

    #[test]
    fn test_export_type_filter_parses() {
        use clap::Parser;

        let cli = ProductCli::try_parse_from(["product", "export", "--type", "Bundle", "3"]).unwrap();
        match cli.command {
            ProductCommand::Export {
                ids, product_type, ..
            } => {
                assert_eq!(ids, vec![ProductId::new(3)]);
                assert_eq!(product_type, Some(ProductType::Bundle));
            }
            _ => panic!("expected export"),
        }
        assert!(ProductCli::try_parse_from(["product", "export", "--type", "kit"]).is_err());
    }
}
