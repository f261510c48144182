//! # Permissions
//!
//! Permission identifiers granted to a role. Grants are stored by the
//! permission store; this type only answers membership questions.
//!
//! Two wildcard forms are understood: `*` grants everything, and a grant
//! ending in `.*` (e.g. `posts.*`) grants every identifier under that
//! dotted prefix.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::abilities::Ability;

/// Permission that grants every other permission.
pub const WILDCARD: &str = "*";

/// A set of permission identifiers (e.g. `view-user`, `manage-roles`).
///
/// The [`WILDCARD`] entry matches any permission.
///
/// # Example
///
/// ```
/// use arkhe_rbac::{Ability, PermissionSet};
///
/// let mut set = PermissionSet::new();
/// set.add("view-user");
/// set.add("update-user");
///
/// assert!(set.has("view-user"));
/// assert!(set.allows(Ability::Update, "user"));
/// assert!(!set.allows(Ability::Delete, "user"));
///
/// let everything = PermissionSet::from_strings(&["*"]);
/// assert!(everything.has("force-delete-role"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<String>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: BTreeSet::new(),
        }
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
    }

    /// Add multiple permissions to the set.
    pub fn add_all<I>(&mut self, permissions: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for perm in permissions {
            self.add(perm);
        }
    }

    /// Remove a permission from the set.
    ///
    /// Returns `true` if the permission was present.
    pub fn remove(&mut self, permission: &str) -> bool {
        self.permissions.remove(permission)
    }

    /// Check if the set grants a permission, directly or through a wildcard.
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
            || self.is_wildcard()
            || self.iter().any(|grant| prefix_grants(grant, permission))
    }

    /// Check if the set grants `ability` on `resource`.
    pub fn allows(&self, ability: Ability, resource: &str) -> bool {
        self.has(&ability.permission_for(resource))
    }

    /// Check if the set holds the wildcard permission.
    pub fn is_wildcard(&self) -> bool {
        self.permissions.contains(WILDCARD)
    }

    /// Iterate over the stored identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Create from a list of permission strings.
    pub fn from_strings(perms: &[&str]) -> Self {
        perms.iter().copied().collect()
    }

    /// Get the count of stored identifiers.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Check if this set grants every permission stored in `other`.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.iter().all(|perm| self.has(perm))
    }
}

fn prefix_grants(grant: &str, permission: &str) -> bool {
    let Some(prefix) = grant.strip_suffix(".*") else {
        return false;
    };
    permission
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('.'))
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        set.add_all(iter);
        set
    }
}
