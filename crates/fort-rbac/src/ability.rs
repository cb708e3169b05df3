//! # Abilities
//!
//! An ability is an atomic permission record identified by an action and a
//! resource, optionally narrowed by a policy scope. Membership checks work on
//! the ability's slug, conventionally `action.resource`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RbacError, RbacResult};

/// Build the canonical slug for an action and resource pair.
///
/// Both parts are trimmed and lowercased, so `"Update"` and `" role"` give
/// `"update.role"`.
///
/// # Example
///
/// ```
/// use fort_rbac::ability::slug_for;
///
/// assert_eq!(slug_for("Update", " role"), "update.role");
/// ```
pub fn slug_for(action: &str, resource: &str) -> String {
    format!(
        "{}.{}",
        action.trim().to_lowercase(),
        resource.trim().to_lowercase()
    )
}

/// A permission grant as stored in the `abilities` table.
///
/// Abilities are soft-deleted: `deleted_at` is set and the row is retained.
/// The pair (`action`, `resource`) is unique among abilities that are not
/// deleted, and so is the slug.
///
/// The slug defaults to `action.resource`. It can be overridden, which is how
/// a role's own slug (e.g. `editor`) is granted as an ability.
///
/// # Example
///
/// ```
/// use fort_rbac::Ability;
///
/// let ability = Ability::new(1, "update", "role", "Update roles");
/// assert_eq!(ability.slug, "update.role");
/// assert!(ability.is_active());
///
/// let editor = Ability::new(2, "hold", "editor", "Editor role").with_slug("editor");
/// assert_eq!(editor.slug, "editor");
/// assert!(editor.has_custom_slug());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ability {
    /// Auto-increment identifier
    pub id: u32,

    /// Action being granted, e.g. `update`
    pub action: String,

    /// Resource the action applies to, e.g. `role`
    pub resource: String,

    /// Identifier used for membership checks
    pub slug: String,

    /// Optional policy scope further restricting where the ability applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    /// Human label
    pub name: String,

    /// Optional free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the ability was created
    pub created_at: DateTime<Utc>,

    /// When the ability was last edited
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Ability {
    /// Create an active ability with the current timestamp.
    pub fn new(
        id: u32,
        action: impl Into<String>,
        resource: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let action = action.into();
        let resource = resource.into();
        Self {
            id,
            slug: slug_for(&action, &resource),
            action,
            resource,
            policy: None,
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Set the policy scope.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the conventional slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into().trim().to_string();
        self
    }

    /// Whether the slug differs from `action.resource`.
    pub fn has_custom_slug(&self) -> bool {
        self.slug != slug_for(&self.action, &self.resource)
    }

    /// Whether the ability has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Whether the ability has been soft-deleted.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether this ability has the given (action, resource) key.
    pub fn same_key(&self, action: &str, resource: &str) -> bool {
        slug_for(&self.action, &self.resource) == slug_for(action, resource)
    }
}

/// Input for defining a new ability through the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAbility {
    /// Action, required
    pub action: String,
    /// Resource, required
    pub resource: String,
    /// Slug override; `action.resource` when absent
    pub slug: Option<String>,
    /// Optional policy scope
    pub policy: Option<String>,
    /// Human label, required
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

impl NewAbility {
    /// Create the input with the required fields.
    pub fn new(
        action: impl Into<String>,
        resource: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            slug: None,
            policy: None,
            name: name.into(),
            description: None,
        }
    }

    /// Set the policy scope.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the conventional slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// The slug the ability will be stored with.
    pub fn resolved_slug(&self) -> String {
        match self.slug {
            Some(ref slug) => slug.trim().to_string(),
            None => slug_for(&self.action, &self.resource),
        }
    }

    /// Reject blank required fields.
    pub fn validate(&self) -> RbacResult<()> {
        require("action", &self.action)?;
        require("resource", &self.resource)?;
        require("name", &self.name)?;
        if let Some(ref slug) = self.slug {
            require("slug", slug)?;
        }
        Ok(())
    }
}

/// Partial edit of an existing ability. `None` leaves a field untouched.
///
/// For the nullable columns an inner `None` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityChanges {
    /// New action
    pub action: Option<String>,
    /// New resource
    pub resource: Option<String>,
    /// New policy scope (`Some(None)` clears it)
    pub policy: Option<Option<String>>,
    /// New human label
    pub name: Option<String>,
    /// New description (`Some(None)` clears it)
    pub description: Option<Option<String>>,
}

impl AbilityChanges {
    /// Reject blank values for the required fields being changed.
    pub fn validate(&self) -> RbacResult<()> {
        if let Some(ref action) = self.action {
            require("action", action)?;
        }
        if let Some(ref resource) = self.resource {
            require("resource", resource)?;
        }
        if let Some(ref name) = self.name {
            require("name", name)?;
        }
        Ok(())
    }

    /// Apply the changes to an ability, bumping `updated_at`.
    ///
    /// A conventional slug follows a change of action or resource; an
    /// overridden slug is kept.
    pub fn apply_to(self, ability: &mut Ability) {
        let conventional = !ability.has_custom_slug();
        if let Some(action) = self.action {
            ability.action = action;
        }
        if let Some(resource) = self.resource {
            ability.resource = resource;
        }
        if let Some(policy) = self.policy {
            ability.policy = policy;
        }
        if let Some(name) = self.name {
            ability.name = name;
        }
        if let Some(description) = self.description {
            ability.description = description;
        }
        if conventional {
            ability.slug = slug_for(&ability.action, &ability.resource);
        }
        ability.updated_at = Utc::now();
    }
}

fn require(field: &str, value: &str) -> RbacResult<()> {
    if value.trim().is_empty() {
        return Err(RbacError::invalid(format!("ability {} must not be empty", field)));
    }
    Ok(())
}
