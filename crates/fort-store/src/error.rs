//! Error types for the store and its configuration

use fort_rbac::RbacError;
use thiserror::Error;
use uuid::Uuid;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user with this id
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// No role with this id
    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    /// A role with this slug already exists
    #[error("Role already exists: {0}")]
    DuplicateRole(String),

    /// Registry or authorization error
    #[error(transparent)]
    Rbac(#[from] RbacError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether this is an authorization denial.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, StoreError::Rbac(RbacError::Forbidden))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::UserNotFound(_) | StoreError::RoleNotFound(_) => 404,
            StoreError::DuplicateRole(_) => 409,
            StoreError::Rbac(err) => err.status_code(),
            StoreError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::UserNotFound(_) => "USER_NOT_FOUND",
            StoreError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            StoreError::DuplicateRole(_) => "DUPLICATE_ROLE",
            StoreError::Rbac(err) => err.error_code(),
            StoreError::Config(_) => "CONFIG_ERROR",
        }
    }
}
