//! # Ability Registry
//!
//! Two halves:
//!
//! - [`HasAbilities`] resolves an entity's *effective* abilities: the
//!   deduplicated union of its direct abilities and the abilities of every
//!   role it holds. It is a pure computation over already-loaded data.
//! - [`AbilityRegistry`] is the catalog of defined abilities, edited by an
//!   administrator. Among active abilities both the (action, resource) key
//!   and the slug are unique. Abilities are soft-deleted, never removed.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::ability::{Ability, AbilityChanges, NewAbility};
use crate::ability_set::AbilitySet;
use crate::error::{RbacError, RbacResult};
use crate::subject::Role;

/// An entity that holds abilities directly and through roles.
pub trait HasAbilities {
    /// Abilities assigned directly to the entity.
    fn direct_abilities(&self) -> &[Ability];

    /// Roles assigned to the entity.
    fn assigned_roles(&self) -> &[Role];

    /// Union of direct abilities and the abilities of all assigned roles.
    ///
    /// Recomputed on every call so it always reflects the loaded
    /// relationships.
    fn effective_abilities(&self) -> AbilitySet {
        let mut set: AbilitySet = self.direct_abilities().iter().collect();
        for role in self.assigned_roles() {
            set.add_all(&role.abilities);
        }
        set
    }

    /// Whether `slug` is among the effective abilities.
    fn has_ability(&self, slug: &str) -> bool {
        self.direct_abilities().iter().any(|a| a.slug == slug)
            || self
                .assigned_roles()
                .iter()
                .any(|role| role.abilities.iter().any(|a| a.slug == slug))
    }
}

/// Effective abilities of an entity.
pub fn effective_abilities<E: HasAbilities + ?Sized>(entity: &E) -> AbilitySet {
    entity.effective_abilities()
}

/// Whether an entity holds an ability, directly or through a role.
pub fn has_ability<E: HasAbilities + ?Sized>(entity: &E, slug: &str) -> bool {
    entity.has_ability(slug)
}

/// Catalog of defined abilities.
///
/// # Example
///
/// ```
/// use fort_rbac::{AbilityRegistry, NewAbility};
///
/// let mut registry = AbilityRegistry::new();
/// let view = registry.define(NewAbility::new("view", "role", "View roles")).unwrap();
/// assert_eq!(view.id, 1);
///
/// // (action, resource) is unique among active abilities
/// assert!(registry.define(NewAbility::new("view", "role", "Again")).is_err());
///
/// registry.soft_delete(view.id).unwrap();
/// assert!(registry.find_by_slug("view.role").is_none());
/// assert!(registry.get(view.id).unwrap().is_trashed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    abilities: BTreeMap<u32, Ability>,
    next_id: u32,
}

impl AbilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            abilities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Define a new ability.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if action, resource, name or a slug override is blank
    /// - `DuplicateAbility` if an active ability has the same key or slug
    pub fn define(&mut self, input: NewAbility) -> RbacResult<Ability> {
        input.validate()?;
        let slug = input.resolved_slug();

        let id = self.next_id.max(1);
        let mut ability = Ability::new(id, input.action, input.resource, input.name);
        ability.slug = slug;
        ability.policy = input.policy;
        ability.description = input.description;
        self.ensure_unique(&ability, None)?;

        self.next_id = id + 1;
        self.abilities.insert(id, ability.clone());
        Ok(ability)
    }

    /// Edit an existing ability, active or trashed.
    pub fn update(&mut self, id: u32, changes: AbilityChanges) -> RbacResult<Ability> {
        changes.validate()?;
        let mut candidate = self.get(id)?.clone();
        changes.apply_to(&mut candidate);
        if candidate.is_active() {
            self.ensure_unique(&candidate, Some(id))?;
        }

        self.abilities.insert(id, candidate.clone());
        Ok(candidate)
    }

    /// Mark an ability deleted. The record is retained.
    ///
    /// Deleting an already-trashed ability keeps the original timestamp.
    pub fn soft_delete(&mut self, id: u32) -> RbacResult<Ability> {
        let ability = self.get_mut(id)?;
        if ability.deleted_at.is_none() {
            ability.deleted_at = Some(Utc::now());
        }
        Ok(ability.clone())
    }

    /// Bring a trashed ability back.
    ///
    /// # Errors
    ///
    /// `DuplicateAbility` if an active ability took the same key meanwhile.
    pub fn restore(&mut self, id: u32) -> RbacResult<Ability> {
        let current = self.get(id)?;
        if current.is_trashed() {
            self.ensure_unique(current, Some(id))?;
        }

        let ability = self.get_mut(id)?;
        ability.deleted_at = None;
        Ok(ability.clone())
    }

    /// Look up any ability by id, including trashed ones.
    pub fn get(&self, id: u32) -> RbacResult<&Ability> {
        self.abilities.get(&id).ok_or(RbacError::AbilityNotFound(id))
    }

    /// Look up an active ability by slug.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Ability> {
        self.active().find(|a| a.slug == slug)
    }

    /// Active abilities in id order.
    pub fn active(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values().filter(|a| a.is_active())
    }

    /// Soft-deleted abilities in id order.
    pub fn trashed(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values().filter(|a| a.is_trashed())
    }

    /// Whether the registry knows this id and the ability is active.
    pub fn is_active(&self, id: u32) -> bool {
        self.abilities.get(&id).is_some_and(Ability::is_active)
    }

    /// Number of active abilities.
    pub fn len(&self) -> usize {
        self.active().count()
    }

    /// Whether there are no active abilities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_mut(&mut self, id: u32) -> RbacResult<&mut Ability> {
        self.abilities
            .get_mut(&id)
            .ok_or(RbacError::AbilityNotFound(id))
    }

    fn ensure_unique(&self, candidate: &Ability, except: Option<u32>) -> RbacResult<()> {
        let taken = self.active().any(|a| {
            Some(a.id) != except
                && (a.same_key(&candidate.action, &candidate.resource) || a.slug == candidate.slug)
        });
        if taken {
            return Err(RbacError::DuplicateAbility {
                action: candidate.action.clone(),
                resource: candidate.resource.clone(),
            });
        }
        Ok(())
    }
}
