//! Error types for ability administration and authorization
//!
//! A denied authorization decision is not an error inside the policy; it only
//! becomes [`RbacError::Forbidden`] when a caller asks the gate for a `Result`.

use thiserror::Error;

/// RBAC error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RbacError {
    /// The actor is not authorized for this operation.
    ///
    /// Carries no explanation so that denial leaks nothing about the
    /// clause that failed.
    #[error("This action is unauthorized")]
    Forbidden,

    /// Caller contract violation detected at the boundary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An active ability already exists for this action and resource
    #[error("Ability already exists for action '{action}' on resource '{resource}'")]
    DuplicateAbility {
        /// Ability action
        action: String,
        /// Ability resource
        resource: String,
    },

    /// No ability with this id exists in the registry
    #[error("Ability not found: {0}")]
    AbilityNotFound(u32),
}

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RbacError::Forbidden => 403,
            RbacError::InvalidArgument(_) => 400,
            RbacError::DuplicateAbility { .. } => 409,
            RbacError::AbilityNotFound(_) => 404,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::Forbidden => "FORBIDDEN",
            RbacError::InvalidArgument(_) => "INVALID_ARGUMENT",
            RbacError::DuplicateAbility { .. } => "DUPLICATE_ABILITY",
            RbacError::AbilityNotFound(_) => "ABILITY_NOT_FOUND",
        }
    }

    /// Shorthand for an [`RbacError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        RbacError::InvalidArgument(message.into())
    }
}
