//! Error types for administration operations
//!
//! These errors cover policy denials, input validation and storage failures
//! raised by the user and role services.

use arkhe_rbac::{DenyReason, RoleId};
use thiserror::Error;

/// Administration error types.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The acting principal is not allowed to perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(DenyReason),

    /// Input failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Requested user or role does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A user or role with the same identity already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Protected roles can never be deleted
    #[error("Cannot delete protected system role: {0}")]
    ProtectedRole(RoleId),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for administration operations.
pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    /// Build a validation error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AdminError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AdminError::Storage(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AdminError::Forbidden(_) | AdminError::ProtectedRole(_) => 403,
            AdminError::NotFound(_) => 404,
            AdminError::Conflict(_) => 409,
            AdminError::Validation { .. } => 422,
            AdminError::Storage(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Forbidden(reason) => reason.code(),
            AdminError::Validation { .. } => "VALIDATION_ERROR",
            AdminError::NotFound(_) => "NOT_FOUND",
            AdminError::Conflict(_) => "CONFLICT",
            AdminError::ProtectedRole(_) => "PROTECTED_ROLE",
            AdminError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<DenyReason> for AdminError {
    fn from(reason: DenyReason) -> Self {
        AdminError::Forbidden(reason)
    }
}
