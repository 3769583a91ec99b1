//! Unit price and tax calculation for bundle item snapshots.

use std::cmp::Ordering;
use storeadmin_catalog::catalog::current_timestamp;
use storeadmin_catalog::prelude::*;

use crate::config::TaxConfig;
use crate::error::Result;

/// Computes the price a customer pays for one unit of a product.
pub trait PriceCalculator: Send + Sync {
    /// Unit price of `product` bought in `quantity`, after the bundle item
    /// discount when the product sits in a bundle.
    ///
    /// The result is always a unit price; `quantity` only selects tier prices.
    fn final_price(
        &self,
        product: &Product,
        quantity: u32,
        bundle_item: Option<&ProductBundleItem>,
    ) -> Result<Money>;
}

/// Adjusts a price for display according to tax settings.
pub trait TaxCalculator: Send + Sync {
    fn price_with_tax(&self, product: &Product, price: Money) -> Result<Money>;
}

/// Price calculator using the product's own price data.
///
/// Candidates are the base price, the tier price for the quantity and an
/// active special price. The lowest candidate wins, then the bundle item
/// discount is applied.
#[derive(Debug, Clone, Default)]
pub struct CatalogPriceCalculator {
    now: Option<i64>,
}

impl CatalogPriceCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate special price windows at a fixed timestamp.
    pub fn at(now: i64) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> i64 {
        self.now.unwrap_or_else(current_timestamp)
    }
}

fn lower(current: Money, candidate: Money) -> Result<Money> {
    Ok(match candidate.try_cmp(&current)? {
        Ordering::Less => candidate,
        _ => current,
    })
}

impl PriceCalculator for CatalogPriceCalculator {
    fn final_price(
        &self,
        product: &Product,
        quantity: u32,
        bundle_item: Option<&ProductBundleItem>,
    ) -> Result<Money> {
        let mut price = product.price;

        if let Some(tier) = product.tier_price_for(quantity) {
            price = lower(price, tier)?;
        }

        if let Some(special) = product.special_price {
            if special.is_active_at(self.now()) {
                price = lower(price, special.price)?;
            }
        }

        if let Some(discount) = bundle_item.and_then(|item| item.discount) {
            price = discount.apply(price)?;
        }

        Ok(price.non_negative())
    }
}

/// Single-rate tax from [`TaxConfig`].
#[derive(Debug, Clone)]
pub struct FlatRateTax {
    config: TaxConfig,
}

impl FlatRateTax {
    pub fn new(config: TaxConfig) -> Self {
        Self { config }
    }

    fn add_tax(&self, price: Money) -> Money {
        price.multiply_decimal(1.0 + self.config.rate_percent / 100.0)
    }

    fn remove_tax(&self, price: Money) -> Money {
        price.multiply_decimal(100.0 / (100.0 + self.config.rate_percent))
    }
}

impl TaxCalculator for FlatRateTax {
    fn price_with_tax(&self, product: &Product, price: Money) -> Result<Money> {
        let TaxConfig {
            prices_include_tax,
            display_prices_with_tax,
            ..
        } = self.config;

        if product.is_tax_exempt {
            return Ok(if prices_include_tax {
                self.remove_tax(price)
            } else {
                price
            });
        }

        Ok(match (prices_include_tax, display_prices_with_tax) {
            (false, true) => self.add_tax(price),
            (true, false) => self.remove_tax(price),
            _ => price,
        })
    }
}
