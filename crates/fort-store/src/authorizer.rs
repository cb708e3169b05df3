//! Id-based authorization over a loader.
//!
//! Resolves the actor and targets through an [`AccessLoader`], then asks the
//! [`Gate`]. All loading happens before the decision, so the policy itself
//! stays free of I/O.

use fort_rbac::{Gate, RbacError, RoleOperation, RoleRequest};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::loader::AccessLoader;

/// Targets of a role operation, by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Targets {
    /// Target role
    pub role: Option<Uuid>,
    /// Secondary target user
    pub user: Option<Uuid>,
}

impl Targets {
    /// No targets (create, import, export).
    pub fn collection() -> Self {
        Self::default()
    }

    /// A single role.
    pub fn role(role_id: Uuid) -> Self {
        Self {
            role: Some(role_id),
            user: None,
        }
    }

    /// A role and the user it is given to or removed from.
    pub fn assignment(role_id: Uuid, user_id: Uuid) -> Self {
        Self {
            role: Some(role_id),
            user: Some(user_id),
        }
    }
}

/// Authorizes role operations for stored users and roles.
#[derive(Debug, Clone)]
pub struct Authorizer<L> {
    loader: L,
    gate: Gate,
}

impl<L: AccessLoader> Authorizer<L> {
    /// Create an authorizer.
    pub fn new(loader: L, gate: Gate) -> Self {
        Self { loader, gate }
    }

    /// Get the loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Authorize an operation.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `RoleNotFound` for unknown ids
    /// - `Rbac(InvalidArgument)` when targets do not fit the operation
    /// - `Rbac(Forbidden)` when the operation is denied
    #[instrument(skip(self))]
    pub async fn authorize(
        &self,
        operation: RoleOperation,
        actor_id: Uuid,
        targets: Targets,
    ) -> StoreResult<()> {
        let actor = self.loader.resolve_user(actor_id).await?;
        let role = match targets.role {
            Some(id) => Some(self.loader.resolve_role(id).await?),
            None => None,
        };
        let user = match targets.user {
            Some(id) => Some(self.loader.resolve_user(id).await?),
            None => None,
        };

        let request = RoleRequest {
            role: role.as_ref(),
            user: user.as_ref(),
        };
        self.gate.authorize(operation, &actor, request)?;
        Ok(())
    }

    /// Whether the operation is allowed.
    ///
    /// Denial is `Ok(false)`; lookup and argument errors are returned.
    pub async fn allows(
        &self,
        operation: RoleOperation,
        actor_id: Uuid,
        targets: Targets,
    ) -> StoreResult<bool> {
        match self.authorize(operation, actor_id, targets).await {
            Ok(()) => Ok(true),
            Err(StoreError::Rbac(RbacError::Forbidden)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
