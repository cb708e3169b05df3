//! Data-access interface feeding the policy.
//!
//! The policy only ever sees fully-resolved snapshots. Implementations load
//! relationships here; soft-deleted abilities must not appear in any result.

use async_trait::async_trait;
use fort_rbac::{Ability, Role, User};
use uuid::Uuid;

use crate::error::StoreResult;

/// Loads users, roles and their relationships.
///
/// Relationship loaders return an empty list for an unknown id, so a missing
/// relationship degrades to a denial rather than an error. Record loaders
/// (`load_user`, `load_role`) fail with a not-found error.
#[async_trait]
pub trait AccessLoader: Send + Sync {
    /// Bare user record with its flags; relationships are left empty.
    async fn load_user(&self, user_id: Uuid) -> StoreResult<User>;

    /// Bare role record with its flags; relationships are left empty.
    async fn load_role(&self, role_id: Uuid) -> StoreResult<Role>;

    /// Abilities assigned directly to a user.
    async fn load_abilities_for(&self, user_id: Uuid) -> StoreResult<Vec<Ability>>;

    /// Roles assigned to a user, each with its abilities and users loaded.
    async fn load_roles_for(&self, user_id: Uuid) -> StoreResult<Vec<Role>>;

    /// Abilities attached to a role.
    async fn load_role_abilities(&self, role_id: Uuid) -> StoreResult<Vec<Ability>>;

    /// Users holding a role.
    async fn load_role_users(&self, role_id: Uuid) -> StoreResult<Vec<Uuid>>;

    /// User with direct abilities and roles loaded.
    ///
    /// The default issues separate loads, so a concurrent write can land
    /// between them. Stores that can read atomically should override this and
    /// `resolve_role`.
    async fn resolve_user(&self, user_id: Uuid) -> StoreResult<User> {
        let mut user = self.load_user(user_id).await?;
        user.abilities = self.load_abilities_for(user_id).await?;
        user.roles = self.load_roles_for(user_id).await?;
        Ok(user)
    }

    /// Role with abilities and users loaded.
    async fn resolve_role(&self, role_id: Uuid) -> StoreResult<Role> {
        let mut role = self.load_role(role_id).await?;
        role.abilities = self.load_role_abilities(role_id).await?;
        role.users = self.load_role_users(role_id).await?;
        Ok(role)
    }
}
