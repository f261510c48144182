//! Principals and roles as seen by the decision engine
//!
//! Both are value objects loaded by the caller from storage; the engine never
//! fetches them itself.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::permissions::PermissionSet;
use crate::roles::RoleId;

/// Identifier of a principal.
pub type PrincipalId = Uuid;

/// An authenticated actor, or the user account an actor is acting on.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::{Principal, UserRole};
/// use uuid::Uuid;
///
/// let admin = Principal::with_role(Uuid::now_v7(), UserRole::Admin);
/// assert!(admin.has_role("admin"));
/// assert!(admin.has_any_role(&["root", "admin"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal ID
    pub id: PrincipalId,

    /// Roles currently held
    #[serde(default)]
    pub roles: HashSet<RoleId>,
}

impl Principal {
    /// Create a principal holding the given roles.
    pub fn new<I>(id: PrincipalId, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RoleId>,
    {
        Self {
            id,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a principal holding a single role.
    pub fn with_role(id: PrincipalId, role: impl Into<RoleId>) -> Self {
        Self::new(id, [role.into()])
    }

    /// Create a principal holding no role.
    pub fn without_roles(id: PrincipalId) -> Self {
        Self {
            id,
            roles: HashSet::new(),
        }
    }

    /// Check if the principal holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Check if the principal holds at least one of `roles`.
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.has_role(role.as_ref()))
    }

    /// Check if two principals are the same account.
    pub fn is_same_as(&self, other: &Principal) -> bool {
        self.id == other.id
    }
}

/// A role definition.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::Role;
///
/// let role = Role::new("moderator", "Moderator");
/// assert_eq!(role.id.as_str(), "moderator");
/// assert!(role.permissions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier (immutable once referenced)
    pub id: RoleId,

    /// Human-readable label
    pub label: String,

    /// Granted permissions
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl Role {
    /// Create a role without permissions.
    pub fn new(id: impl Into<RoleId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            permissions: PermissionSet::new(),
        }
    }

    /// Set the granted permissions.
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }
}
