//! In-memory store.
//!
//! Suitable for single-process applications and testing. Tables live behind
//! a single `RwLock`; every loader returns owned snapshots so no lock is held
//! while a decision is evaluated.

use async_trait::async_trait;
use fort_rbac::{Ability, AbilityChanges, AbilityRegistry, NewAbility, Role, User};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::loader::AccessLoader;
use crate::schema::SchemaConfig;

#[derive(Debug, Default)]
struct Tables {
    abilities: AbilityRegistry,
    /// Bare role records, relationships empty
    roles: HashMap<Uuid, Role>,
    /// Bare user records, relationships empty
    users: HashMap<Uuid, User>,
    user_abilities: HashMap<Uuid, BTreeSet<u32>>,
    role_abilities: HashMap<Uuid, BTreeSet<u32>>,
    user_roles: HashMap<Uuid, BTreeSet<Uuid>>,
}

impl Tables {
    fn active_abilities(&self, ids: Option<&BTreeSet<u32>>) -> Vec<Ability> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.abilities.get(*id).ok())
            .filter(|a| a.is_active())
            .cloned()
            .collect()
    }

    fn role_users(&self, role_id: Uuid) -> Vec<Uuid> {
        let mut users: Vec<Uuid> = self
            .user_roles
            .iter()
            .filter(|(_, roles)| roles.contains(&role_id))
            .map(|(user_id, _)| *user_id)
            .collect();
        users.sort();
        users
    }

    fn resolved_role(&self, role_id: Uuid) -> Option<Role> {
        let mut role = self.roles.get(&role_id)?.clone();
        role.abilities = self.active_abilities(self.role_abilities.get(&role_id));
        role.users = self.role_users(role_id);
        Some(role)
    }

    fn resolved_user(&self, user_id: Uuid) -> Option<User> {
        let mut user = self.users.get(&user_id)?.clone();
        user.abilities = self.active_abilities(self.user_abilities.get(&user_id));
        user.roles = self.assigned_roles(user_id);
        Some(user)
    }

    fn assigned_roles(&self, user_id: Uuid) -> Vec<Role> {
        self.user_roles
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|role_id| self.resolved_role(*role_id))
            .collect()
    }

    fn require_user(&self, user_id: Uuid) -> StoreResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::UserNotFound(user_id))
        }
    }

    fn require_role(&self, role_id: Uuid) -> StoreResult<()> {
        if self.roles.contains_key(&role_id) {
            Ok(())
        } else {
            Err(StoreError::RoleNotFound(role_id))
        }
    }

    fn require_active_ability(&self, ability_id: u32) -> StoreResult<()> {
        if self.abilities.is_active(ability_id) {
            Ok(())
        } else {
            Err(fort_rbac::RbacError::AbilityNotFound(ability_id).into())
        }
    }
}

/// In-memory implementation of [`AccessLoader`] with administration helpers.
///
/// # Example
///
/// ```
/// use fort_rbac::{NewAbility, Role, User};
/// use fort_store::{AccessLoader, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), fort_store::StoreError> {
/// let store = MemoryStore::new();
/// let view = store.define_ability(NewAbility::new("view", "role", "View roles")).await?;
/// let user = store.create_user(User::new("alice")).await?;
/// store.grant_ability_to_user(user.id, view.id).await?;
///
/// let resolved = store.resolve_user(user.id).await?;
/// assert_eq!(resolved.abilities.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    schema: SchemaConfig,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the default schema.
    pub fn new() -> Self {
        Self::from_parts(SchemaConfig::default())
    }

    /// Create an empty store for a resolved schema configuration.
    ///
    /// # Errors
    ///
    /// `Config` if the table name is not a plain identifier.
    pub fn with_schema(schema: SchemaConfig) -> StoreResult<Self> {
        schema.validate()?;
        Ok(Self::from_parts(schema))
    }

    fn from_parts(schema: SchemaConfig) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                abilities: AbilityRegistry::new(),
                ..Default::default()
            })),
            schema,
        }
    }

    /// Schema configuration the store was built with.
    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    // Abilities

    /// Define a new ability.
    pub async fn define_ability(&self, input: NewAbility) -> StoreResult<Ability> {
        let mut tables = self.tables.write().await;
        let ability = tables.abilities.define(input)?;
        info!(
            table = %self.schema.abilities_table,
            ability_id = ability.id,
            slug = %ability.slug,
            "Ability defined"
        );
        Ok(ability)
    }

    /// Edit an ability.
    pub async fn update_ability(&self, id: u32, changes: AbilityChanges) -> StoreResult<Ability> {
        let mut tables = self.tables.write().await;
        let ability = tables.abilities.update(id, changes)?;
        info!(table = %self.schema.abilities_table, ability_id = id, "Ability updated");
        Ok(ability)
    }

    /// Soft-delete an ability. Assignments are kept but no longer loaded.
    pub async fn soft_delete_ability(&self, id: u32) -> StoreResult<Ability> {
        let mut tables = self.tables.write().await;
        let ability = tables.abilities.soft_delete(id)?;
        info!(table = %self.schema.abilities_table, ability_id = id, "Ability soft-deleted");
        Ok(ability)
    }

    /// Restore a soft-deleted ability.
    pub async fn restore_ability(&self, id: u32) -> StoreResult<Ability> {
        let mut tables = self.tables.write().await;
        let ability = tables.abilities.restore(id)?;
        info!(table = %self.schema.abilities_table, ability_id = id, "Ability restored");
        Ok(ability)
    }

    /// Look up an active ability by slug.
    pub async fn find_ability(&self, slug: &str) -> Option<Ability> {
        self.tables.read().await.abilities.find_by_slug(slug).cloned()
    }

    /// Look up any ability by id, including trashed ones.
    pub async fn ability(&self, id: u32) -> StoreResult<Ability> {
        Ok(self.tables.read().await.abilities.get(id)?.clone())
    }

    /// All active abilities in id order.
    pub async fn abilities(&self) -> Vec<Ability> {
        self.tables.read().await.abilities.active().cloned().collect()
    }

    /// All soft-deleted abilities in id order.
    pub async fn trashed_abilities(&self) -> Vec<Ability> {
        self.tables.read().await.abilities.trashed().cloned().collect()
    }

    // Roles and users

    /// Store a role record. Relationships on the input are ignored.
    pub async fn create_role(&self, role: Role) -> StoreResult<Role> {
        let mut tables = self.tables.write().await;
        if tables.roles.values().any(|r| r.slug == role.slug) {
            return Err(StoreError::DuplicateRole(role.slug));
        }
        let bare = Role {
            abilities: Vec::new(),
            users: Vec::new(),
            ..role
        };
        tables.roles.insert(bare.id, bare.clone());
        info!(role_id = %bare.id, slug = %bare.slug, "Role created");
        Ok(bare)
    }

    /// Delete a role and its assignments.
    pub async fn delete_role(&self, role_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .roles
            .remove(&role_id)
            .ok_or(StoreError::RoleNotFound(role_id))?;
        tables.role_abilities.remove(&role_id);
        for roles in tables.user_roles.values_mut() {
            roles.remove(&role_id);
        }
        info!(role_id = %role_id, "Role deleted");
        Ok(())
    }

    /// Store a user record. Relationships on the input are ignored.
    pub async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let bare = User {
            abilities: Vec::new(),
            roles: Vec::new(),
            ..user
        };
        tables.users.insert(bare.id, bare.clone());
        info!(user_id = %bare.id, "User created");
        Ok(bare)
    }

    // Assignments

    /// Assign an active ability directly to a user.
    pub async fn grant_ability_to_user(&self, user_id: Uuid, ability_id: u32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        tables.require_active_ability(ability_id)?;
        tables.user_abilities.entry(user_id).or_default().insert(ability_id);
        debug!(user_id = %user_id, ability_id, "Ability granted to user");
        Ok(())
    }

    /// Take a directly-assigned ability from a user.
    ///
    /// # Returns
    ///
    /// `true` if the ability was assigned
    pub async fn revoke_ability_from_user(&self, user_id: Uuid, ability_id: u32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        Ok(tables
            .user_abilities
            .get_mut(&user_id)
            .is_some_and(|ids| ids.remove(&ability_id)))
    }

    /// Attach an active ability to a role.
    pub async fn grant_ability_to_role(&self, role_id: Uuid, ability_id: u32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_role(role_id)?;
        tables.require_active_ability(ability_id)?;
        tables.role_abilities.entry(role_id).or_default().insert(ability_id);
        debug!(role_id = %role_id, ability_id, "Ability granted to role");
        Ok(())
    }

    /// Detach an ability from a role.
    ///
    /// # Returns
    ///
    /// `true` if the ability was attached
    pub async fn revoke_ability_from_role(&self, role_id: Uuid, ability_id: u32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.require_role(role_id)?;
        Ok(tables
            .role_abilities
            .get_mut(&role_id)
            .is_some_and(|ids| ids.remove(&ability_id)))
    }

    /// Give a role to a user.
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        tables.require_role(role_id)?;
        tables.user_roles.entry(user_id).or_default().insert(role_id);
        debug!(user_id = %user_id, role_id = %role_id, "Role assigned");
        Ok(())
    }

    /// Remove a role from a user.
    ///
    /// # Returns
    ///
    /// `true` if the user held the role
    pub async fn unassign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        tables.require_role(role_id)?;
        Ok(tables
            .user_roles
            .get_mut(&user_id)
            .is_some_and(|roles| roles.remove(&role_id)))
    }
}

#[async_trait]
impl AccessLoader for MemoryStore {
    async fn load_user(&self, user_id: Uuid) -> StoreResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::UserNotFound(user_id))
    }

    async fn load_role(&self, role_id: Uuid) -> StoreResult<Role> {
        self.tables
            .read()
            .await
            .roles
            .get(&role_id)
            .cloned()
            .ok_or(StoreError::RoleNotFound(role_id))
    }

    async fn load_abilities_for(&self, user_id: Uuid) -> StoreResult<Vec<Ability>> {
        let tables = self.tables.read().await;
        Ok(tables.active_abilities(tables.user_abilities.get(&user_id)))
    }

    async fn load_roles_for(&self, user_id: Uuid) -> StoreResult<Vec<Role>> {
        Ok(self.tables.read().await.assigned_roles(user_id))
    }

    async fn load_role_abilities(&self, role_id: Uuid) -> StoreResult<Vec<Ability>> {
        let tables = self.tables.read().await;
        Ok(tables.active_abilities(tables.role_abilities.get(&role_id)))
    }

    async fn load_role_users(&self, role_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self.tables.read().await.role_users(role_id))
    }

    // Snapshots are resolved under one read guard so they match a single
    // committed state

    async fn resolve_user(&self, user_id: Uuid) -> StoreResult<User> {
        self.tables
            .read()
            .await
            .resolved_user(user_id)
            .ok_or(StoreError::UserNotFound(user_id))
    }

    async fn resolve_role(&self, role_id: Uuid) -> StoreResult<Role> {
        self.tables
            .read()
            .await
            .resolved_role(role_id)
            .ok_or(StoreError::RoleNotFound(role_id))
    }
}
