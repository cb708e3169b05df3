//! Roles and users
//!
//! Fully-resolved snapshots of the entities the policy reasons about. The
//! relationships (abilities, roles, users) are loaded by a store before a
//! decision is requested; nothing in here performs I/O.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ability::Ability;
use crate::registry::HasAbilities;

/// Flags shared by roles and user accounts.
///
/// On a target, either flag exempts the entity from mutation.
pub trait Guarded {
    /// Whether the entity carries the superadmin flag.
    fn is_superadmin(&self) -> bool;

    /// Whether the entity is protected from mutation and deletion.
    fn is_protected(&self) -> bool;

    /// Whether neither flag is set.
    fn is_mutable(&self) -> bool {
        !self.is_superadmin() && !self.is_protected()
    }
}

/// A named bundle of abilities assignable to users.
///
/// # Example
///
/// ```
/// use fort_rbac::{Ability, Role};
///
/// let role = Role::new("editor", "Editor")
///     .with_ability(Ability::new(1, "update", "post", "Update posts"));
/// assert_eq!(role.slug, "editor");
/// assert!(!role.is_unused());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Unique role ID
    pub id: Uuid,

    /// Canonical identifier, also usable as an ability slug
    pub slug: String,

    /// Human-readable name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Abilities attached to the role
    #[serde(default)]
    pub abilities: Vec<Ability>,

    /// Users holding the role
    #[serde(default)]
    pub users: Vec<Uuid>,

    /// Superadmin roles bypass checks for holders and cannot be managed
    #[serde(default)]
    pub is_superadmin: bool,

    /// Protected roles cannot be mutated or deleted
    #[serde(default)]
    pub is_protected: bool,
}

impl Role {
    /// Create a role with no abilities, users or flags.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            slug: slug.into(),
            name: name.into(),
            description: None,
            abilities: Vec::new(),
            users: Vec::new(),
            is_superadmin: false,
            is_protected: false,
        }
    }

    /// Set the ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an ability.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Attach a user.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.users.push(user_id);
        self
    }

    /// Set the superadmin flag.
    pub fn superadmin(mut self) -> Self {
        self.is_superadmin = true;
        self
    }

    /// Set the protected flag.
    pub fn protected(mut self) -> Self {
        self.is_protected = true;
        self
    }

    /// Whether the role has neither abilities nor users attached.
    pub fn is_unused(&self) -> bool {
        self.abilities.is_empty() && self.users.is_empty()
    }
}

impl Guarded for Role {
    fn is_superadmin(&self) -> bool {
        self.is_superadmin
    }

    fn is_protected(&self) -> bool {
        self.is_protected
    }
}

impl HasAbilities for Role {
    fn direct_abilities(&self) -> &[Ability] {
        &self.abilities
    }

    fn assigned_roles(&self) -> &[Role] {
        &[]
    }
}

/// A user account being authorized, or targeted by give/remove.
///
/// # Example
///
/// ```
/// use fort_rbac::{Ability, HasAbilities, Role, User};
///
/// let user = User::new("alice")
///     .with_ability(Ability::new(1, "view", "role", "View roles"))
///     .with_role(Role::new("editor", "Editor"));
///
/// assert!(user.has_ability("view.role"));
/// assert!(user.has_role("editor"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Directly-assigned abilities
    #[serde(default)]
    pub abilities: Vec<Ability>,

    /// Assigned roles, each carrying its own abilities
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Superadmin account
    #[serde(default)]
    pub is_superadmin: bool,

    /// Protected account
    #[serde(default)]
    pub is_protected: bool,
}

impl User {
    /// Create a user with no abilities, roles or flags.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            abilities: Vec::new(),
            roles: Vec::new(),
            is_superadmin: false,
            is_protected: false,
        }
    }

    /// Set the ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Assign an ability directly.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Assign a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Set the superadmin flag.
    pub fn superadmin(mut self) -> Self {
        self.is_superadmin = true;
        self
    }

    /// Set the protected flag.
    pub fn protected(mut self) -> Self {
        self.is_protected = true;
        self
    }

    /// Whether one of the user's assigned roles has this slug.
    pub fn has_role(&self, slug: &str) -> bool {
        self.roles.iter().any(|role| role.slug == slug)
    }

    /// Whether any assigned role is a superadmin role.
    pub fn holds_superadmin_role(&self) -> bool {
        self.roles.iter().any(|role| role.is_superadmin)
    }
}

impl Guarded for User {
    fn is_superadmin(&self) -> bool {
        self.is_superadmin
    }

    fn is_protected(&self) -> bool {
        self.is_protected
    }
}

impl HasAbilities for User {
    fn direct_abilities(&self) -> &[Ability] {
        &self.abilities
    }

    fn assigned_roles(&self) -> &[Role] {
        &self.roles
    }
}
