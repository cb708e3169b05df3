//! # Role Operations
//!
//! The operations an actor can request on roles. Each operation maps to one
//! row of the role policy's decision table.

use serde::{Deserialize, Serialize};

use crate::ability::slug_for;

/// Resource name used when deriving the conventional ability slug.
pub const ROLE_RESOURCE: &str = "role";

/// Operations that can be performed on roles.
///
/// - **View**: See a role and its abilities
/// - **Create**: Define a new role
/// - **Update**: Edit a role the actor already holds
/// - **Delete**: Remove an unused role
/// - **Import** / **Export**: Bulk transfer of role definitions
/// - **Give** / **Remove**: Assign a role to, or take it from, another user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleOperation {
    /// View a role.
    View,
    /// Create roles.
    Create,
    /// Update a role.
    Update,
    /// Delete a role.
    Delete,
    /// Import roles.
    Import,
    /// Export roles.
    Export,
    /// Give a role to a user.
    Give,
    /// Remove a role from a user.
    Remove,
}

impl RoleOperation {
    /// Get the string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleOperation::View => "view",
            RoleOperation::Create => "create",
            RoleOperation::Update => "update",
            RoleOperation::Delete => "delete",
            RoleOperation::Import => "import",
            RoleOperation::Export => "export",
            RoleOperation::Give => "give",
            RoleOperation::Remove => "remove",
        }
    }

    /// Get all operations.
    pub fn all() -> Vec<Self> {
        vec![
            RoleOperation::View,
            RoleOperation::Create,
            RoleOperation::Update,
            RoleOperation::Delete,
            RoleOperation::Import,
            RoleOperation::Export,
            RoleOperation::Give,
            RoleOperation::Remove,
        ]
    }

    /// Conventional ability slug gating this operation, e.g. `update.role`.
    pub fn ability_slug(&self) -> String {
        slug_for(self.as_str(), ROLE_RESOURCE)
    }

    /// Whether the operation targets a specific role.
    pub fn needs_role(&self) -> bool {
        !matches!(
            self,
            RoleOperation::Create | RoleOperation::Import | RoleOperation::Export
        )
    }

    /// Whether the operation also targets a user (give/remove).
    pub fn needs_user(&self) -> bool {
        matches!(self, RoleOperation::Give | RoleOperation::Remove)
    }
}

impl std::fmt::Display for RoleOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
