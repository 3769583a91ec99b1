//! Operation-level authorization.
//!
//! Every admin operation is named by an [`Operation`]. A [`PermissionPolicy`]
//! maps each operation to the [`Permission`] it requires, and principals get
//! permissions through their [`Role`]s. The admin facade checks the policy
//! once per call, so individual operations never repeat the check.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{AdminError, Result};

/// A capability an admin principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    AccessAdminPanel,
    ManageCatalog,
    ManageSettings,
    ManageAcl,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AccessAdminPanel => "access_admin_panel",
            Permission::ManageCatalog => "manage_catalog",
            Permission::ManageSettings => "manage_settings",
            Permission::ManageAcl => "manage_acl",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ViewProduct,
    EditProduct,
    ExportProducts,
    ListCombinations,
    AddCombination,
    DeleteCombination,
    CreateAllCombinations,
    DeleteAllCombinations,
    ListBundleItems,
    AddBundleItems,
    UpdateBundleItem,
    DeleteBundleItem,
    SnapshotBundle,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::ViewProduct,
        Operation::EditProduct,
        Operation::ExportProducts,
        Operation::ListCombinations,
        Operation::AddCombination,
        Operation::DeleteCombination,
        Operation::CreateAllCombinations,
        Operation::DeleteAllCombinations,
        Operation::ListBundleItems,
        Operation::AddBundleItems,
        Operation::UpdateBundleItem,
        Operation::DeleteBundleItem,
        Operation::SnapshotBundle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ViewProduct => "view_product",
            Operation::EditProduct => "edit_product",
            Operation::ExportProducts => "export_products",
            Operation::ListCombinations => "list_combinations",
            Operation::AddCombination => "add_combination",
            Operation::DeleteCombination => "delete_combination",
            Operation::CreateAllCombinations => "create_all_combinations",
            Operation::DeleteAllCombinations => "delete_all_combinations",
            Operation::ListBundleItems => "list_bundle_items",
            Operation::AddBundleItems => "add_bundle_items",
            Operation::UpdateBundleItem => "update_bundle_item",
            Operation::DeleteBundleItem => "delete_bundle_item",
            Operation::SnapshotBundle => "snapshot_bundle",
        }
    }

    /// Permission required when the policy has no override.
    pub fn default_permission(&self) -> Permission {
        match self {
            Operation::ViewProduct
            | Operation::ListCombinations
            | Operation::ListBundleItems
            | Operation::SnapshotBundle => Permission::AccessAdminPanel,
            _ => Permission::ManageCatalog,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| AdminError::Config(format!("unknown operation: {}", s)))
    }
}

/// Role of an admin principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Storefront customer, no admin access.
    #[default]
    Customer,
    /// Store staff with catalog access.
    Staff,
    /// Store administrator.
    Admin,
    /// Full access, including ACL management.
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Permissions granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Customer => &[],
            Role::Staff => &[AccessAdminPanel, ManageCatalog],
            Role::Admin => &[AccessAdminPanel, ManageCatalog, ManageSettings],
            Role::SuperAdmin => &[AccessAdminPanel, ManageCatalog, ManageSettings, ManageAcl],
        }
    }
}

impl FromStr for Role {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "customer" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(AdminError::Config(format!("unknown role: {}", other))),
        }
    }
}

/// The user an admin operation runs on behalf of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(name: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.roles
            .iter()
            .any(|role| role.permissions().contains(&permission))
    }
}

/// Maps operations to the permission they require.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionPolicy {
    #[serde(default)]
    overrides: HashMap<Operation, Permission>,
}

impl PermissionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a different permission for an operation.
    pub fn with_override(mut self, operation: Operation, permission: Permission) -> Self {
        self.overrides.insert(operation, permission);
        self
    }

    pub fn required(&self, operation: Operation) -> Permission {
        self.overrides
            .get(&operation)
            .copied()
            .unwrap_or_else(|| operation.default_permission())
    }

    /// Check that `principal` may run `operation`.
    pub fn authorize(&self, principal: &Principal, operation: Operation) -> Result<()> {
        let permission = self.required(operation);
        if principal.has_permission(permission) {
            return Ok(());
        }

        tracing::warn!(
            principal = %principal.name,
            %operation,
            %permission,
            "admin operation denied"
        );
        Err(AdminError::PermissionDenied {
            principal: principal.name.clone(),
            operation,
            permission,
        })
    }
}
