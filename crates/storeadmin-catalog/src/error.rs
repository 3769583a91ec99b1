//! Catalog error types.

use thiserror::Error;

/// Errors that can occur while building or transforming catalog values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Attribute XML could not be written or read.
    #[error("Invalid attribute XML: {0}")]
    AttributeXml(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// An identifier could not be parsed.
    #[error("Invalid {kind} id: {value}")]
    InvalidId { kind: &'static str, value: String },

    /// Inventory bounds are inconsistent.
    #[error("Invalid inventory settings: {0}")]
    InvalidInventory(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<quick_xml::Error> for CatalogError {
    fn from(e: quick_xml::Error) -> Self {
        CatalogError::AttributeXml(e.to_string())
    }
}
