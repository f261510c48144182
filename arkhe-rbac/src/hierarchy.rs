//! Role hierarchy
//!
//! Maps each role to the set of roles its holders may assign to other users.
//! The table is explicit configuration data rather than a rank comparison.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{RbacError, RbacResult};
use crate::roles::{RoleId, UserRole};

/// The "allowed-roles" relation between roles.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::{RoleHierarchy, RoleId};
///
/// let hierarchy = RoleHierarchy::reference();
/// let editorial = [RoleId::new("editorial")];
///
/// assert!(hierarchy.can_assign(&editorial, "author"));
/// assert!(!hierarchy.can_assign(&editorial, "contributor"));
/// assert!(hierarchy.allowed_roles_for("nobody").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHierarchy {
    allowed: HashMap<RoleId, HashSet<RoleId>>,
}

impl RoleHierarchy {
    /// Build the reference hierarchy from the built-in role table.
    pub fn reference() -> Self {
        let allowed = UserRole::ALL
            .iter()
            .map(|role| {
                let grants = role.allowed_roles().iter().map(|r| r.id()).collect();
                (role.id(), grants)
            })
            .collect();

        Self { allowed }
    }

    /// Build a hierarchy from a configuration table.
    ///
    /// The table is taken as-is; call [`validate`](Self::validate) before
    /// handing it to an engine.
    pub fn from_table<I, R, G>(table: I) -> Self
    where
        I: IntoIterator<Item = (R, G)>,
        R: Into<RoleId>,
        G: IntoIterator,
        G::Item: Into<RoleId>,
    {
        let allowed = table
            .into_iter()
            .map(|(role, grants)| (role.into(), grants.into_iter().map(Into::into).collect()))
            .collect();

        Self { allowed }
    }

    /// Roles a holder of `role` may assign.
    ///
    /// Unknown roles yield the empty set.
    pub fn allowed_roles_for(&self, role: &str) -> HashSet<RoleId> {
        self.allowed.get(role).cloned().unwrap_or_default()
    }

    /// Check whether a principal holding `actor_roles` may assign `candidate`.
    ///
    /// True iff `candidate` is allowed by at least one held role. An empty or
    /// entirely unknown role set can assign nothing.
    pub fn can_assign<'a, I>(&self, actor_roles: I, candidate: &str) -> bool
    where
        I: IntoIterator<Item = &'a RoleId>,
    {
        actor_roles.into_iter().any(|role| {
            self.allowed
                .get(role.as_str())
                .is_some_and(|grants| grants.contains(candidate))
        })
    }

    /// Union of the allowed sets of every held role, sorted.
    pub fn assignable_roles<'a, I>(&self, actor_roles: I) -> BTreeSet<RoleId>
    where
        I: IntoIterator<Item = &'a RoleId>,
    {
        actor_roles
            .into_iter()
            .filter_map(|role| self.allowed.get(role.as_str()))
            .flatten()
            .cloned()
            .collect()
    }

    /// Check if the hierarchy defines `role`.
    pub fn contains(&self, role: &str) -> bool {
        self.allowed.contains_key(role)
    }

    /// Iterate over the roles defined by the hierarchy.
    pub fn roles(&self) -> impl Iterator<Item = &RoleId> {
        self.allowed.keys()
    }

    /// Number of roles defined by the hierarchy.
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Check if the hierarchy defines no roles.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Check the hierarchy invariants.
    ///
    /// - every role may assign itself
    /// - no role may assign a built-in role ranked above it
    /// - a custom role (no rank) may not assign any built-in role
    pub fn validate(&self) -> RbacResult<()> {
        for (role, grants) in &self.allowed {
            if !grants.contains(role) {
                return Err(RbacError::HierarchyNotReflexive(role.clone()));
            }

            let owner = role.builtin();
            for granted in grants {
                let escalates = match (owner, granted.builtin()) {
                    (Some(owner), Some(granted)) => granted.outranks(owner),
                    (None, Some(_)) => true,
                    (_, None) => false,
                };
                if escalates {
                    return Err(RbacError::PrivilegeEscalation {
                        role: role.clone(),
                        granted: granted.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Check that only `top_role` itself may assign `top_role`.
    ///
    /// Applies to custom-role configurations too, where ranks give no
    /// ordering.
    pub fn validate_top_role(&self, top_role: &str) -> RbacResult<()> {
        let mut entries: Vec<_> = self.allowed.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (role, grants) in entries {
            if role.as_str() != top_role && grants.contains(top_role) {
                return Err(RbacError::PrivilegeEscalation {
                    role: role.clone(),
                    granted: RoleId::new(top_role),
                });
            }
        }
        Ok(())
    }
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(ids: &[&str]) -> Vec<RoleId> {
        ids.iter().map(|id| RoleId::new(*id)).collect()
    }

    fn set(ids: &[&str]) -> HashSet<RoleId> {
        ids.iter().map(|id| RoleId::new(*id)).collect()
    }

    #[test]
    fn test_reference_table() {
        let h = RoleHierarchy::reference();
        assert_eq!(
            h.allowed_roles_for("root"),
            set(&["root", "admin", "editorial", "author", "contributor", "subscriber", "guest"])
        );
        assert_eq!(
            h.allowed_roles_for("admin"),
            set(&["admin", "editorial", "author", "contributor", "subscriber", "guest"])
        );
        assert_eq!(h.allowed_roles_for("editorial"), set(&["editorial", "author"]));
        assert_eq!(h.allowed_roles_for("author"), set(&["author"]));
        assert_eq!(h.allowed_roles_for("contributor"), set(&["contributor"]));
        assert_eq!(h.allowed_roles_for("subscriber"), set(&["subscriber"]));
        assert_eq!(h.allowed_roles_for("guest"), set(&["guest"]));
        assert_eq!(h.len(), 7);
    }

    #[test]
    fn test_every_role_assigns_itself() {
        let h = RoleHierarchy::reference();
        for role in h.roles() {
            assert!(h.allowed_roles_for(role.as_str()).contains(role));
        }
    }

    #[test]
    fn test_unknown_role_has_no_rights() {
        let h = RoleHierarchy::reference();
        assert!(h.allowed_roles_for("unknown").is_empty());
        assert!(h.allowed_roles_for("").is_empty());
        assert!(!h.can_assign(&roles(&["unknown"]), "guest"));
    }

    #[test]
    fn test_empty_role_set_assigns_nothing() {
        let h = RoleHierarchy::reference();
        for role in UserRole::ALL {
            assert!(!h.can_assign(&roles(&[]), role.as_str()));
        }
    }

    #[test]
    fn test_privilege_containment_is_asymmetric() {
        let h = RoleHierarchy::reference();
        assert!(h.can_assign(&roles(&["root"]), "guest"));
        assert!(!h.can_assign(&roles(&["guest"]), "root"));
        assert!(h.can_assign(&roles(&["editorial"]), "author"));
        assert!(!h.can_assign(&roles(&["author"]), "editorial"));
    }

    #[test]
    fn test_can_assign_uses_union_of_roles() {
        let h = RoleHierarchy::reference();
        let actor = roles(&["author", "subscriber", "bogus"]);
        assert!(h.can_assign(&actor, "author"));
        assert!(h.can_assign(&actor, "subscriber"));
        assert!(!h.can_assign(&actor, "guest"));
    }

    #[test]
    fn test_assignable_roles() {
        let h = RoleHierarchy::reference();
        let assignable = h.assignable_roles(&roles(&["editorial"]));
        assert_eq!(
            assignable.into_iter().collect::<Vec<_>>(),
            roles(&["author", "editorial"])
        );
        assert!(h.assignable_roles(&roles(&[])).is_empty());
    }

    #[test]
    fn test_reference_validates() {
        assert!(RoleHierarchy::reference().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_reflexive() {
        let h = RoleHierarchy::from_table([("author", vec!["contributor"])]);
        assert!(matches!(h.validate(), Err(RbacError::HierarchyNotReflexive(_))));
    }

    #[test]
    fn test_validate_rejects_escalation() {
        let h = RoleHierarchy::from_table([("editorial", vec!["editorial", "admin"])]);
        match h.validate() {
            Err(RbacError::PrivilegeEscalation { role, granted }) => {
                assert_eq!(role.as_str(), "editorial");
                assert_eq!(granted.as_str(), "admin");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_custom_roles() {
        let h = RoleHierarchy::from_table([
            ("moderator", vec!["moderator", "reviewer"]),
            ("reviewer", vec!["reviewer"]),
        ]);
        assert!(h.validate().is_ok());
        assert!(h.can_assign(&roles(&["moderator"]), "reviewer"));

        let h = RoleHierarchy::from_table([("moderator", vec!["moderator", "guest"])]);
        assert!(matches!(h.validate(), Err(RbacError::PrivilegeEscalation { .. })));
    }

    #[test]
    fn test_validate_top_role_with_custom_roles() {
        let h = RoleHierarchy::from_table([
            ("owner", vec!["owner", "member"]),
            ("member", vec!["member", "owner"]),
        ]);
        // ranks say nothing about custom roles
        assert!(h.validate().is_ok());

        match h.validate_top_role("owner") {
            Err(RbacError::PrivilegeEscalation { role, granted }) => {
                assert_eq!(role.as_str(), "member");
                assert_eq!(granted.as_str(), "owner");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let h = RoleHierarchy::from_table([
            ("owner", vec!["owner", "member"]),
            ("member", vec!["member"]),
        ]);
        assert!(h.validate_top_role("owner").is_ok());
        assert!(RoleHierarchy::reference().validate_top_role("root").is_ok());
    }
}
