//! Protected roles
//!
//! Roles listed here can never be deleted through administration, whoever
//! asks.

use std::collections::HashSet;

use crate::roles::{RoleId, UserRole};

/// Fixed set of roles exempt from deletion.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::ProtectedRoleRegistry;
///
/// let registry = ProtectedRoleRegistry::reference();
/// assert!(registry.is_protected("root"));
/// assert!(registry.is_protected("admin"));
/// assert!(!registry.is_protected("editorial"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoleRegistry {
    roles: HashSet<RoleId>,
}

impl ProtectedRoleRegistry {
    /// Create a registry from a list of role identifiers.
    pub fn new<I>(roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RoleId>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// The reference registry: `root` and `admin`.
    pub fn reference() -> Self {
        Self::new([UserRole::Root, UserRole::Admin])
    }

    /// Check if `role` is protected.
    pub fn is_protected(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Iterate over the protected role identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter()
    }

    /// Number of protected roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if no role is protected.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for ProtectedRoleRegistry {
    fn default() -> Self {
        Self::reference()
    }
}
