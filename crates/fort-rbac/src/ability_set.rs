//! # Ability Sets
//!
//! Materialized, deduplicated sets of ability slugs. An entity's effective
//! abilities are built once into an [`AbilitySet`] and every policy clause is
//! a plain membership test against it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ability::Ability;

/// A set of ability slugs held by a user or role.
///
/// Slugs are compared exactly. Ordering is deterministic so that exported
/// sets and debug output are stable.
///
/// # Example
///
/// ```
/// use fort_rbac::AbilitySet;
///
/// let mut set = AbilitySet::new();
/// set.add("view.role");
/// set.add("update.role");
/// set.add("view.role");
///
/// assert!(set.has("view.role"));
/// assert!(!set.has("delete.role"));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbilitySet {
    slugs: BTreeSet<String>,
}

impl AbilitySet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self {
            slugs: BTreeSet::new(),
        }
    }

    /// Add a slug to the set.
    ///
    /// # Returns
    ///
    /// `true` if the slug was not already present
    pub fn add(&mut self, slug: impl Into<String>) -> bool {
        self.slugs.insert(slug.into())
    }

    /// Add an ability by its slug.
    pub fn add_ability(&mut self, ability: &Ability) -> bool {
        self.add(ability.slug.clone())
    }

    /// Add every ability from an iterator.
    pub fn add_all<'a, I>(&mut self, abilities: I)
    where
        I: IntoIterator<Item = &'a Ability>,
    {
        for ability in abilities {
            self.add_ability(ability);
        }
    }

    /// Remove a slug from the set.
    ///
    /// # Returns
    ///
    /// `true` if the slug was present
    pub fn remove(&mut self, slug: &str) -> bool {
        self.slugs.remove(slug)
    }

    /// Check whether the set contains a slug.
    pub fn has(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: &AbilitySet) {
        self.slugs.extend(other.slugs.iter().cloned());
    }

    /// Check if this set contains every slug of another set.
    pub fn contains_all(&self, other: &AbilitySet) -> bool {
        other.slugs.is_subset(&self.slugs)
    }

    /// Check if this set contains at least one slug of another set.
    pub fn contains_any(&self, other: &AbilitySet) -> bool {
        !self.slugs.is_disjoint(&other.slugs)
    }

    /// Create from a list of slugs.
    ///
    /// # Example
    ///
    /// ```
    /// use fort_rbac::AbilitySet;
    ///
    /// let set = AbilitySet::from_strings(&["view.role", "create.role"]);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn from_strings(slugs: &[&str]) -> Self {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    /// Iterate over the slugs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slugs.iter().map(String::as_str)
    }

    /// Get the count of slugs.
    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

impl FromIterator<String> for AbilitySet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            slugs: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a Ability> for AbilitySet {
    fn from_iter<T: IntoIterator<Item = &'a Ability>>(iter: T) -> Self {
        let mut set = AbilitySet::new();
        set.add_all(iter);
        set
    }
}
