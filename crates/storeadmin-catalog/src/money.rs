//! Money type for prices, adjustments and price overrides.
//!
//! Amounts are integer minor units. Mixed-currency arithmetic and overflow
//! report a `CatalogError`.

use crate::CatalogError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Supported store currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CHF => "CHF ",
        }
    }

    /// Number of minor-unit decimal places.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a value from a decimal amount as typed into an admin form.
    ///
    /// ```
    /// use storeadmin_catalog::money::{Currency, Money};
    /// let price = Money::from_decimal(19.95, Currency::USD);
    /// assert_eq!(price.amount_minor, 1995);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        Self::new((amount * multiplier as f64).round() as i64, currency)
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount_minor as f64 / divisor as f64
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{}{:.places$}", self.currency.symbol(), self.to_decimal())
    }

    fn same_currency(&self, other: &Money) -> Result<(), CatalogError> {
        if self.currency != other.currency {
            return Err(CatalogError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            });
        }
        Ok(())
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, CatalogError> {
        self.same_currency(other)?;
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CatalogError::Overflow)
    }

    /// Multiply by a decimal factor, rounding half away from zero.
    pub fn multiply_decimal(&self, factor: f64) -> Money {
        Money::new(
            (self.amount_minor as f64 * factor).round() as i64,
            self.currency,
        )
    }

    /// A percentage of this amount.
    pub fn percentage(&self, percent: f64) -> Money {
        self.multiply_decimal(percent / 100.0)
    }

    /// Clamp negative amounts to zero.
    pub fn non_negative(self) -> Money {
        if self.is_negative() {
            Money::zero(self.currency)
        } else {
            self
        }
    }

    /// Compare amounts, failing on mixed currencies.
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering, CatalogError> {
        self.same_currency(other)?;
        Ok(self.amount_minor.cmp(&other.amount_minor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99, Currency::USD).amount_minor, 4999);
        assert_eq!(Money::from_decimal(100.0, Currency::JPY).amount_minor, 100);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
    }

    #[test]
    fn test_checked_sub() {
        let a = Money::new(1000, Currency::EUR);
        let b = Money::new(250, Currency::EUR);
        assert_eq!(b.checked_sub(&a).unwrap().amount_minor, -750);
    }

    #[test]
    fn test_currency_mismatch_is_an_error() {
        let usd = Money::new(1000, Currency::USD);
        let eur = Money::new(1000, Currency::EUR);
        assert!(matches!(
            usd.checked_sub(&eur),
            Err(CatalogError::CurrencyMismatch { .. })
        ));
        assert!(usd.try_cmp(&eur).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let big = Money::new(i64::MAX, Currency::USD);
        let negative = Money::new(-1, Currency::USD);
        assert_eq!(big.checked_sub(&negative), Err(CatalogError::Overflow));
    }

    #[test]
    fn test_percentage_and_clamp() {
        let m = Money::new(10000, Currency::USD);
        assert_eq!(m.percentage(15.0).amount_minor, 1500);
        assert!(Money::new(-5, Currency::USD).non_negative().is_zero());
    }
}
