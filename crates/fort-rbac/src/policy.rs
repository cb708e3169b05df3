//! # Role Policy
//!
//! Authorization predicates for role management. Every decision is a
//! short-circuit conjunction of independent clauses over already-resolved
//! data: the actor's effective abilities, the target role's flags and
//! relationships, and for give/remove the flags of the target user.
//!
//! | Operation | Clauses |
//! |---|---|
//! | view, create, import, export | actor has `ability` |
//! | update | actor has `ability`, actor holds the role, role is not superadmin, role is not protected |
//! | delete | role has no abilities, role has no users, actor has `ability`, actor has the role slug as an ability, role is not superadmin, role is not protected |
//! | give, remove | actor has `ability`, actor has the role slug as an ability, user is not superadmin, user is not protected |
//!
//! `ability` is the slug supplied by the caller for the operation being
//! checked (for example `update.role`). The policy never derives it.

use crate::operation::RoleOperation;
use crate::registry::HasAbilities;
use crate::subject::{Guarded, Role, User};

/// Targets of a role operation.
///
/// Operations on the role collection (create, import, export) carry no
/// targets; give and remove carry both a role and a user.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleRequest<'a> {
    /// Target role
    pub role: Option<&'a Role>,
    /// Secondary target user
    pub user: Option<&'a User>,
}

impl<'a> RoleRequest<'a> {
    /// A request without targets.
    pub fn collection() -> Self {
        Self::default()
    }

    /// A request targeting one role.
    pub fn role(role: &'a Role) -> Self {
        Self {
            role: Some(role),
            user: None,
        }
    }

    /// A request targeting a role and the user it is given to or removed from.
    pub fn assignment(role: &'a Role, user: &'a User) -> Self {
        Self {
            role: Some(role),
            user: Some(user),
        }
    }

    /// Whether the targets present match what the operation needs.
    pub fn fits(&self, operation: RoleOperation) -> bool {
        (!operation.needs_role() || self.role.is_some())
            && (!operation.needs_user() || self.user.is_some())
    }
}

/// Decision table for role management.
///
/// Stateless: every method is a pure, total function of its arguments and
/// returns `false` rather than failing when data is absent.
///
/// # Example
///
/// ```
/// use fort_rbac::{Ability, Role, RoleOperation, RolePolicy, RoleRequest, User};
///
/// let role = Role::new("editor", "Editor");
/// let actor = User::new("alice").with_ability(Ability::new(1, "view", "role", "View roles"));
///
/// let policy = RolePolicy::new();
/// assert!(policy.view("view.role", &actor, &role));
/// assert!(policy.decide(RoleOperation::View, "view.role", &actor, RoleRequest::role(&role)));
/// assert!(!policy.decide(RoleOperation::Delete, "delete.role", &actor, RoleRequest::role(&role)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl RolePolicy {
    /// Create the policy.
    pub fn new() -> Self {
        Self
    }

    /// Dispatch an operation tag to its predicate.
    ///
    /// A request missing a target the operation needs is denied.
    pub fn decide(
        &self,
        operation: RoleOperation,
        ability: &str,
        actor: &User,
        request: RoleRequest<'_>,
    ) -> bool {
        match (operation, request.role, request.user) {
            (RoleOperation::View, Some(role), _) => self.view(ability, actor, role),
            (RoleOperation::Create, _, _) => self.create(ability, actor),
            (RoleOperation::Update, Some(role), _) => self.update(ability, actor, role),
            (RoleOperation::Delete, Some(role), _) => self.delete(ability, actor, role),
            (RoleOperation::Import, _, _) => self.import(ability, actor),
            (RoleOperation::Export, _, _) => self.export(ability, actor),
            (RoleOperation::Give, Some(role), Some(user)) => self.give(ability, actor, role, user),
            (RoleOperation::Remove, Some(role), Some(user)) => {
                self.remove(ability, actor, role, user)
            }
            _ => false,
        }
    }

    /// Whether the actor can view the role.
    pub fn view(&self, ability: &str, actor: &User, _role: &Role) -> bool {
        actor.has_ability(ability)
    }

    /// Whether the actor can create roles.
    pub fn create(&self, ability: &str, actor: &User) -> bool {
        actor.has_ability(ability)
    }

    /// Whether the actor can update the role.
    pub fn update(&self, ability: &str, actor: &User, role: &Role) -> bool {
        actor.has_ability(ability)          // actor can update roles
            && actor.has_role(&role.slug)   // actor already holds the role
            && role.is_mutable()
    }

    /// Whether the actor can delete the role.
    pub fn delete(&self, ability: &str, actor: &User, role: &Role) -> bool {
        if !role.is_unused() {
            return false;
        }
        let held = actor.effective_abilities();
        held.has(ability)                   // actor can delete roles
            && held.has(&role.slug)         // actor already has the role's slug
            && role.is_mutable()
    }

    /// Whether the actor can import roles.
    pub fn import(&self, ability: &str, actor: &User) -> bool {
        actor.has_ability(ability)
    }

    /// Whether the actor can export roles.
    pub fn export(&self, ability: &str, actor: &User) -> bool {
        actor.has_ability(ability)
    }

    /// Whether the actor can give the role to `user`.
    pub fn give(&self, ability: &str, actor: &User, role: &Role, user: &User) -> bool {
        self.assign(ability, actor, role, user)
    }

    /// Whether the actor can remove the role from `user`.
    pub fn remove(&self, ability: &str, actor: &User, role: &Role, user: &User) -> bool {
        self.assign(ability, actor, role, user)
    }

    // give and remove share their clauses
    fn assign(&self, ability: &str, actor: &User, role: &Role, user: &User) -> bool {
        let held = actor.effective_abilities();
        held.has(ability) && held.has(&role.slug) && user.is_mutable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Ability;
    use uuid::Uuid;

    fn grant(slug: &str) -> Ability {
        Ability::new(0, "grant", slug, slug).with_slug(slug)
    }

    #[test]
    fn test_request_fits_operation() {
        let role = Role::new("editor", "Editor");
        let user = User::new("bob");
        assert!(RoleRequest::collection().fits(RoleOperation::Create));
        assert!(!RoleRequest::collection().fits(RoleOperation::View));
        assert!(RoleRequest::role(&role).fits(RoleOperation::Delete));
        assert!(!RoleRequest::role(&role).fits(RoleOperation::Give));
        assert!(RoleRequest::assignment(&role, &user).fits(RoleOperation::Remove));
    }

    #[test]
    fn test_decide_denies_missing_targets() {
        let policy = RolePolicy::new();
        let actor = User::new("alice")
            .with_ability(grant("give.role"))
            .with_ability(grant("editor"));
        let role = Role::new("editor", "Editor");

        assert!(!policy.decide(RoleOperation::Give, "give.role", &actor, RoleRequest::role(&role)));
        assert!(!policy.decide(
            RoleOperation::View,
            "give.role",
            &actor,
            RoleRequest::collection()
        ));
    }

    #[test]
    fn test_update_needs_role_membership_not_slug_ability() {
        let policy = RolePolicy::new();
        let role = Role::new("editor", "Editor");

        let by_ability = User::new("alice")
            .with_ability(grant("update.role"))
            .with_ability(grant("editor"));
        assert!(!policy.update("update.role", &by_ability, &role));

        let by_membership = User::new("bob")
            .with_ability(grant("update.role"))
            .with_role(role.clone());
        assert!(policy.update("update.role", &by_membership, &role));
    }

    #[test]
    fn test_delete_needs_slug_ability_not_role_membership() {
        let policy = RolePolicy::new();
        let role = Role::new("editor", "Editor");

        let by_membership = User::new("alice")
            .with_ability(grant("delete.role"))
            .with_role(role.clone());
        assert!(!policy.delete("delete.role", &by_membership, &role));

        let by_ability = User::new("bob")
            .with_ability(grant("delete.role"))
            .with_ability(grant("editor"));
        assert!(policy.delete("delete.role", &by_ability, &role));
    }

    #[test]
    fn test_flagged_targets_are_not_mutable() {
        let policy = RolePolicy::new();
        let editor = Role::new("editor", "Editor");
        let actor = User::new("alice")
            .with_ability(grant("update.role"))
            .with_ability(grant("delete.role"))
            .with_ability(grant("give.role"))
            .with_ability(grant("editor"))
            .with_role(editor.clone());

        assert!(policy.update("update.role", &actor, &editor));
        assert!(policy.delete("delete.role", &actor, &editor));
        assert!(policy.give("give.role", &actor, &editor, &User::new("bob")));

        for flagged in [editor.clone().protected(), editor.clone().superadmin()] {
            assert!(!policy.update("update.role", &actor, &flagged));
            assert!(!policy.delete("delete.role", &actor, &flagged));
        }
        for target in [User::new("root").protected(), User::new("root").superadmin()] {
            assert!(!policy.give("give.role", &actor, &editor, &target));
            assert!(!policy.remove("give.role", &actor, &editor, &target));
        }
    }

    #[test]
    fn test_delete_needs_unused_role() {
        let policy = RolePolicy::new();
        let actor = User::new("alice")
            .with_ability(grant("delete.role"))
            .with_ability(grant("editor"));
        let with_user = Role::new("editor", "Editor").with_user(Uuid::now_v7());
        let with_ability = Role::new("editor", "Editor").with_ability(grant("view.role"));

        assert!(!policy.delete("delete.role", &actor, &with_user));
        assert!(!policy.delete("delete.role", &actor, &with_ability));
    }

    #[test]
    fn test_role_slug_ability_may_come_from_another_role() {
        let policy = RolePolicy::new();
        let target = Role::new("editor", "Editor");
        let user = User::new("carol");
        let actor = User::new("dave").with_role(
            Role::new("manager", "Manager")
                .with_ability(grant("give.role"))
                .with_ability(grant("editor")),
        );
        assert!(policy.give("give.role", &actor, &target, &user));
        assert!(policy.remove("give.role", &actor, &target, &user));
    }
}
