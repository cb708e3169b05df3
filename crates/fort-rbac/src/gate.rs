//! # Gate
//!
//! In-process dispatch in front of [`RolePolicy`]. The gate maps an
//! operation to the ability slug that gates it, rejects requests that do not
//! fit the operation, applies the actor-superadmin bypass, and turns denial
//! into [`RbacError::Forbidden`] for callers that want a `Result`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{RbacError, RbacResult};
use crate::operation::RoleOperation;
use crate::policy::{RolePolicy, RoleRequest};
use crate::subject::User;

/// Gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Allow superadmin actors without consulting the policy.
    ///
    /// An actor counts as superadmin when its own flag is set or when it
    /// holds a superadmin role. The bypass skips every clause, including the
    /// delete preconditions: a superadmin may delete a role that still has
    /// abilities or users attached, or one flagged protected.
    #[serde(default = "default_superadmin_bypass")]
    pub superadmin_bypass: bool,

    /// Ability slugs replacing the `<operation>.role` convention.
    #[serde(default)]
    pub abilities: HashMap<RoleOperation, String>,
}

fn default_superadmin_bypass() -> bool {
    true
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            superadmin_bypass: default_superadmin_bypass(),
            abilities: HashMap::new(),
        }
    }
}

impl GateConfig {
    /// Replace the ability slug for one operation.
    pub fn with_ability(mut self, operation: RoleOperation, slug: impl Into<String>) -> Self {
        self.abilities.insert(operation, slug.into());
        self
    }

    /// Disable the superadmin bypass.
    pub fn without_bypass(mut self) -> Self {
        self.superadmin_bypass = false;
        self
    }

    /// Ability slug gating an operation.
    pub fn ability_for(&self, operation: RoleOperation) -> String {
        self.abilities
            .get(&operation)
            .cloned()
            .unwrap_or_else(|| operation.ability_slug())
    }
}

/// Authorization entry point for role operations.
///
/// # Example
///
/// ```
/// use fort_rbac::{Ability, Gate, RbacError, Role, RoleOperation, RoleRequest, User};
///
/// let gate = Gate::default();
/// let role = Role::new("editor", "Editor");
/// let actor = User::new("alice").with_ability(Ability::new(1, "view", "role", "View roles"));
///
/// assert!(gate.allows(RoleOperation::View, &actor, RoleRequest::role(&role)));
/// assert_eq!(
///     gate.authorize(RoleOperation::Update, &actor, RoleRequest::role(&role)),
///     Err(RbacError::Forbidden)
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Gate {
    config: GateConfig,
    policy: RolePolicy,
}

impl Gate {
    /// Create a gate with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            policy: RolePolicy::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Whether the actor may perform the operation.
    ///
    /// Malformed requests are denied.
    pub fn allows(&self, operation: RoleOperation, actor: &User, request: RoleRequest<'_>) -> bool {
        self.authorize(operation, actor, request).is_ok()
    }

    /// Whether the actor may not perform the operation.
    pub fn denies(&self, operation: RoleOperation, actor: &User, request: RoleRequest<'_>) -> bool {
        !self.allows(operation, actor, request)
    }

    /// Authorize the operation.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the request lacks a target the operation needs,
    ///   or the configured ability slug is blank
    /// - `Forbidden` if the policy denies the operation
    pub fn authorize(
        &self,
        operation: RoleOperation,
        actor: &User,
        request: RoleRequest<'_>,
    ) -> RbacResult<()> {
        let ability = self.config.ability_for(operation);
        Self::validate(operation, &ability, request)?;

        if self.config.superadmin_bypass && (actor.is_superadmin || actor.holds_superadmin_role()) {
            debug!(operation = %operation, actor = %actor.id, "Superadmin bypass");
            return Ok(());
        }

        if self.policy.decide(operation, &ability, actor, request) {
            Ok(())
        } else {
            debug!(
                operation = %operation,
                actor = %actor.id,
                role = request.role.map(|r| r.slug.as_str()).unwrap_or("-"),
                "Role operation denied"
            );
            Err(RbacError::Forbidden)
        }
    }

    fn validate(operation: RoleOperation, ability: &str, request: RoleRequest<'_>) -> RbacResult<()> {
        if ability.trim().is_empty() {
            return Err(RbacError::invalid(format!(
                "no ability slug configured for '{}'",
                operation
            )));
        }
        if operation.needs_role() && request.role.is_none() {
            return Err(RbacError::invalid(format!("'{}' requires a target role", operation)));
        }
        if operation.needs_user() && request.user.is_none() {
            return Err(RbacError::invalid(format!("'{}' requires a target user", operation)));
        }
        Ok(())
    }
}
