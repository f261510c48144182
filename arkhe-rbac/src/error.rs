//! Error types for RBAC configuration
//!
//! Authorization decisions never fail; these errors only surface while a
//! configuration is loaded and validated at startup.

use thiserror::Error;

use crate::roles::RoleId;

/// RBAC configuration error types.
#[derive(Debug, Error)]
pub enum RbacError {
    /// A hierarchy entry does not allow its own role
    #[error("Role '{0}' must be allowed to assign itself")]
    HierarchyNotReflexive(RoleId),

    /// A hierarchy entry grants a more privileged role
    #[error("Role '{role}' may not assign more privileged role '{granted}'")]
    PrivilegeEscalation {
        /// Role owning the hierarchy entry
        role: RoleId,
        /// Role it was allowed to grant
        granted: RoleId,
    },

    /// The top role is missing from the hierarchy
    #[error("Top role '{0}' is not defined in the hierarchy")]
    UnknownTopRole(RoleId),

    /// A role list that must not be empty is empty
    #[error("Configuration list '{0}' must not be empty")]
    EmptyRoleList(&'static str),

    /// A role identifier is blank
    #[error("Blank role identifier in '{0}'")]
    BlankRoleId(&'static str),

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for RBAC configuration operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::HierarchyNotReflexive(_) => "HIERARCHY_NOT_REFLEXIVE",
            RbacError::PrivilegeEscalation { .. } => "PRIVILEGE_ESCALATION",
            RbacError::UnknownTopRole(_) => "UNKNOWN_TOP_ROLE",
            RbacError::EmptyRoleList(_) => "EMPTY_ROLE_LIST",
            RbacError::BlankRoleId(_) => "BLANK_ROLE_ID",
            RbacError::Io { .. } => "CONFIG_IO_ERROR",
            RbacError::Parse(_) => "CONFIG_PARSE_ERROR",
        }
    }
}
