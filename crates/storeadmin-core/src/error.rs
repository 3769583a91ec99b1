//! Admin error types.

use storeadmin_catalog::{CatalogError, ProductId};
use thiserror::Error;

use crate::permissions::{Operation, Permission};
use crate::tabs::TabApplyError;

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Errors that abort an admin operation.
///
/// Soft failures the operator should see (ineligible bundle candidates,
/// duplicate combinations, truncated batches) are returned as warnings in the
/// operation outcome instead.
#[derive(Error, Debug)]
pub enum AdminError {
    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The principal lacks the permission an operation requires.
    #[error("{principal} may not {operation}: requires {permission}")]
    PermissionDenied {
        principal: String,
        operation: Operation,
        permission: Permission,
    },

    /// Posted form data is malformed or inconsistent.
    #[error("Invalid form field {field}: {reason}")]
    InvalidForm { field: String, reason: String },

    /// Bundle operations were requested on a non-bundle product.
    #[error("Product {0} is not a bundle")]
    NotABundle(ProductId),

    /// A product edit tab failed; the error keeps the partially applied product.
    #[error(transparent)]
    Tab(Box<TabApplyError>),

    /// Domain-level error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdminError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        AdminError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_form(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AdminError::InvalidForm {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<TabApplyError> for AdminError {
    fn from(e: TabApplyError) -> Self {
        AdminError::Tab(Box::new(e))
    }
}

impl From<toml::de::Error> for AdminError {
    fn from(e: toml::de::Error) -> Self {
        AdminError::Config(e.to_string())
    }
}
