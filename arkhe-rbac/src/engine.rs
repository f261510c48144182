//! # Authorization Engine
//!
//! Combines the role hierarchy, the protected role registry and a few
//! structural rules into the decisions the administration screens need.
//!
//! ## Rules
//!
//! **Users**
//! - Only user-manager roles (`root`, `admin`) may list, view, create, update,
//!   restore or delete users.
//! - Only `root` may act on a user holding `root`.
//! - Nobody may delete their own account.
//! - A role may only be granted if it is in the actor's allowed-roles set.
//!
//! **Roles**
//! - Only `root` may list, view, create or update role definitions.
//! - Protected roles (`root`, `admin`) can never be deleted.
//!
//! Every check is total: unknown roles, empty role sets and missing targets
//! all resolve to a denial.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::abilities::Ability;
use crate::config::RbacConfig;
use crate::decision::{Decision, DenyReason};
use crate::error::RbacResult;
use crate::hierarchy::RoleHierarchy;
use crate::principal::{Principal, Role};
use crate::protected::ProtectedRoleRegistry;
use crate::roles::RoleId;

#[derive(Debug)]
struct EngineInner {
    hierarchy: RoleHierarchy,
    protected: ProtectedRoleRegistry,
    top_role: RoleId,
    user_manager_roles: Vec<RoleId>,
    admin_roles: Vec<RoleId>,
}

/// Policy decision engine.
///
/// Cheap to clone; clones share the same immutable configuration.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::{AuthorizationEngine, Principal, Role, UserRole};
/// use uuid::Uuid;
///
/// let engine = AuthorizationEngine::reference();
/// let root = Principal::with_role(Uuid::now_v7(), UserRole::Root);
/// let admin = Principal::with_role(Uuid::now_v7(), UserRole::Admin);
///
/// assert!(engine.can_manage_user(&root, &admin));
/// assert!(!engine.can_manage_user(&admin, &root));
/// assert!(!engine.can_delete_user(&root, &root));
///
/// assert!(engine.can_delete_role(&root, Some(&Role::new("subscriber", "Subscriber"))));
/// assert!(!engine.can_delete_role(&root, Some(&Role::new("admin", "Admin"))));
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    inner: Arc<EngineInner>,
}

impl AuthorizationEngine {
    /// Build an engine from a configuration after validating it.
    pub fn from_config(config: &RbacConfig) -> RbacResult<Self> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(EngineInner {
                hierarchy: config.role_hierarchy(),
                protected: config.protected_registry(),
                top_role: config.top_role.clone(),
                user_manager_roles: config.user_manager_roles.clone(),
                admin_roles: config.admin.roles.clone(),
            }),
        })
    }

    /// Build an engine from the reference configuration.
    pub fn reference() -> Self {
        let config = RbacConfig::default();
        Self {
            inner: Arc::new(EngineInner {
                hierarchy: RoleHierarchy::reference(),
                protected: ProtectedRoleRegistry::reference(),
                top_role: config.top_role,
                user_manager_roles: config.user_manager_roles,
                admin_roles: config.admin.roles,
            }),
        }
    }

    /// The role hierarchy in use.
    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.inner.hierarchy
    }

    /// The protected role registry in use.
    pub fn protected_roles(&self) -> &ProtectedRoleRegistry {
        &self.inner.protected
    }

    fn holds_top_role(&self, principal: &Principal) -> bool {
        principal.has_role(self.inner.top_role.as_str())
    }

    fn is_user_manager(&self, principal: &Principal) -> bool {
        principal.has_any_role(&self.inner.user_manager_roles)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Decide whether `actor` may manage the account of `target`.
    pub fn decide_manage_user(&self, actor: &Principal, target: &Principal) -> Decision {
        if !self.is_user_manager(actor) {
            return deny(actor, "manage_user", DenyReason::NotAdministrator);
        }
        if self.holds_top_role(target) && !self.holds_top_role(actor) {
            return deny(actor, "manage_user", DenyReason::RootTargetRequiresRoot);
        }
        Decision::allow()
    }

    /// Check whether `actor` may manage the account of `target`.
    pub fn can_manage_user(&self, actor: &Principal, target: &Principal) -> bool {
        self.decide_manage_user(actor, target).is_allowed()
    }

    /// Check whether `actor` may view `target`.
    pub fn can_view_user(&self, actor: &Principal, target: &Principal) -> bool {
        self.can_manage_user(actor, target)
    }

    /// Check whether `actor` may update `target`.
    pub fn can_update_user(&self, actor: &Principal, target: &Principal) -> bool {
        self.can_manage_user(actor, target)
    }

    /// Check whether `actor` may restore a deleted `target`.
    pub fn can_restore_user(&self, actor: &Principal, target: &Principal) -> bool {
        self.can_manage_user(actor, target)
    }

    /// Decide whether `actor` may delete `target`.
    ///
    /// Self-deletion is always denied, before any role check.
    pub fn decide_delete_user(&self, actor: &Principal, target: &Principal) -> Decision {
        if actor.is_same_as(target) {
            return deny(actor, "delete_user", DenyReason::SelfDeletion);
        }
        self.decide_manage_user(actor, target)
    }

    /// Check whether `actor` may delete `target`.
    pub fn can_delete_user(&self, actor: &Principal, target: &Principal) -> bool {
        self.decide_delete_user(actor, target).is_allowed()
    }

    /// Check whether `actor` may permanently delete `target`.
    pub fn can_force_delete_user(&self, actor: &Principal, target: &Principal) -> bool {
        self.can_delete_user(actor, target)
    }

    /// Decide whether `actor` may list users or create new ones.
    pub fn decide_administer_users(&self, actor: &Principal) -> Decision {
        if self.is_user_manager(actor) {
            Decision::allow()
        } else {
            deny(actor, "administer_users", DenyReason::NotAdministrator)
        }
    }

    /// Check whether `actor` may list users.
    pub fn can_view_any_users(&self, actor: &Principal) -> bool {
        self.decide_administer_users(actor).is_allowed()
    }

    /// Check whether `actor` may create users.
    pub fn can_create_user(&self, actor: &Principal) -> bool {
        self.decide_administer_users(actor).is_allowed()
    }

    /// Decide whether `actor` may grant `candidate` to any user.
    ///
    /// The target's current role plays no part: the same rule applies when
    /// creating a user and when changing an existing user's role.
    pub fn decide_assign_role(&self, actor: &Principal, candidate: &str) -> Decision {
        if self.inner.hierarchy.can_assign(&actor.roles, candidate) {
            Decision::allow()
        } else {
            deny(actor, "assign_role", DenyReason::RoleNotAssignable)
        }
    }

    /// Check whether `actor` may grant `candidate` to any user.
    pub fn can_assign_role_to(&self, actor: &Principal, candidate: &str) -> bool {
        self.decide_assign_role(actor, candidate).is_allowed()
    }

    /// Roles `actor` may grant, sorted.
    pub fn assignable_roles(&self, actor: &Principal) -> BTreeSet<RoleId> {
        self.inner.hierarchy.assignable_roles(&actor.roles)
    }

    /// Decide `ability` on users.
    ///
    /// `ViewAny` and `Create` ignore `target`; every other ability needs one.
    pub fn authorize_user(
        &self,
        actor: &Principal,
        ability: Ability,
        target: Option<&Principal>,
    ) -> Decision {
        if !ability.requires_target() {
            return self.decide_administer_users(actor);
        }

        let Some(target) = target else {
            return deny(actor, ability.as_str(), DenyReason::MissingTarget);
        };

        match ability {
            Ability::Delete | Ability::ForceDelete => self.decide_delete_user(actor, target),
            _ => self.decide_manage_user(actor, target),
        }
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Decide whether `actor` may view, create or update role definitions.
    ///
    /// Role definitions are reserved to the top role; the target role does
    /// not change the outcome.
    pub fn decide_manage_role(&self, actor: &Principal, _target: Option<&Role>) -> Decision {
        if self.holds_top_role(actor) {
            Decision::allow()
        } else {
            deny(actor, "manage_role", DenyReason::RootOnly)
        }
    }

    /// Check whether `actor` may view, create or update role definitions.
    pub fn can_manage_role(&self, actor: &Principal, target: Option<&Role>) -> bool {
        self.decide_manage_role(actor, target).is_allowed()
    }

    /// Check whether `actor` may list roles.
    pub fn can_view_any_roles(&self, actor: &Principal) -> bool {
        self.can_manage_role(actor, None)
    }

    /// Check whether `actor` may create a role.
    pub fn can_create_role(&self, actor: &Principal) -> bool {
        self.can_manage_role(actor, None)
    }

    /// Check whether `actor` may view `role`.
    pub fn can_view_role(&self, actor: &Principal, role: &Role) -> bool {
        self.can_manage_role(actor, Some(role))
    }

    /// Check whether `actor` may update `role`.
    pub fn can_update_role(&self, actor: &Principal, role: &Role) -> bool {
        self.can_manage_role(actor, Some(role))
    }

    /// Decide whether `actor` may delete `target`.
    pub fn decide_delete_role(&self, actor: &Principal, target: Option<&Role>) -> Decision {
        self.decide_manage_role(actor, target).and_then(|| match target {
            None => deny(actor, "delete_role", DenyReason::MissingTarget),
            Some(role) if self.inner.protected.is_protected(role.id.as_str()) => {
                deny(actor, "delete_role", DenyReason::ProtectedRole)
            }
            Some(_) => Decision::allow(),
        })
    }

    /// Check whether `actor` may delete `target`.
    pub fn can_delete_role(&self, actor: &Principal, target: Option<&Role>) -> bool {
        self.decide_delete_role(actor, target).is_allowed()
    }

    /// Decide `ability` on roles.
    pub fn authorize_role(
        &self,
        actor: &Principal,
        ability: Ability,
        target: Option<&Role>,
    ) -> Decision {
        if ability.is_destructive() {
            return self.decide_delete_role(actor, target);
        }
        if ability.requires_target() && target.is_none() {
            return deny(actor, ability.as_str(), DenyReason::MissingTarget);
        }
        self.decide_manage_role(actor, target)
    }

    // ------------------------------------------------------------------
    // Administration area
    // ------------------------------------------------------------------

    /// Decide whether `actor` may enter the administration area.
    pub fn decide_access_admin(&self, actor: &Principal) -> Decision {
        if actor.has_any_role(&self.inner.admin_roles) {
            Decision::allow()
        } else {
            deny(actor, "access_admin", DenyReason::NoAdminAccess)
        }
    }

    /// Check whether `actor` may enter the administration area.
    pub fn can_access_admin(&self, actor: &Principal) -> bool {
        self.decide_access_admin(actor).is_allowed()
    }
}

impl Default for AuthorizationEngine {
    fn default() -> Self {
        Self::reference()
    }
}

fn deny(actor: &Principal, check: &str, reason: DenyReason) -> Decision {
    debug!(actor_id = %actor.id, check, reason = reason.code(), "Authorization denied");
    Decision::deny(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::UserRole;
    use uuid::Uuid;

    fn principal(role: UserRole) -> Principal {
        Principal::with_role(Uuid::now_v7(), role)
    }

    fn role(id: &str) -> Role {
        Role::new(id, id)
    }

    #[test]
    fn test_only_administrators_manage_users() {
        let engine = AuthorizationEngine::reference();
        let target = principal(UserRole::Guest);

        assert!(engine.can_manage_user(&principal(UserRole::Root), &target));
        assert!(engine.can_manage_user(&principal(UserRole::Admin), &target));
        for role in [
            UserRole::Editorial,
            UserRole::Author,
            UserRole::Contributor,
            UserRole::Subscriber,
            UserRole::Guest,
        ] {
            let actor = principal(role);
            assert_eq!(
                engine.decide_manage_user(&actor, &target),
                Decision::deny(DenyReason::NotAdministrator),
                "{role} must not manage users"
            );
        }
    }

    #[test]
    fn test_root_target_requires_root() {
        let engine = AuthorizationEngine::reference();
        let root = principal(UserRole::Root);
        let other_root = principal(UserRole::Root);
        let admin = principal(UserRole::Admin);

        assert_eq!(
            engine.decide_manage_user(&admin, &root),
            Decision::deny(DenyReason::RootTargetRequiresRoot)
        );
        assert!(engine.can_manage_user(&root, &other_root));
        assert!(engine.can_manage_user(&admin, &principal(UserRole::Admin)));
    }

    #[test]
    fn test_view_and_update_follow_manage() {
        let engine = AuthorizationEngine::reference();
        let admin = principal(UserRole::Admin);
        let root = principal(UserRole::Root);
        let editor = principal(UserRole::Editorial);

        assert!(engine.can_view_user(&admin, &editor));
        assert!(engine.can_update_user(&admin, &editor));
        assert!(!engine.can_view_user(&admin, &root));
        assert!(!engine.can_update_user(&admin, &root));
        assert!(!engine.can_view_user(&editor, &admin));
        assert!(engine.can_restore_user(&root, &admin));
    }

    #[test]
    fn test_self_deletion_always_denied() {
        let engine = AuthorizationEngine::reference();
        for role in UserRole::ALL {
            let actor = principal(role);
            assert_eq!(
                engine.decide_delete_user(&actor, &actor),
                Decision::deny(DenyReason::SelfDeletion)
            );
            assert!(!engine.can_force_delete_user(&actor, &actor));
        }
        let nobody = Principal::without_roles(Uuid::now_v7());
        assert!(!engine.can_delete_user(&nobody, &nobody));
    }

    #[test]
    fn test_delete_user() {
        let engine = AuthorizationEngine::reference();
        let root = principal(UserRole::Root);
        let admin = principal(UserRole::Admin);
        let author = principal(UserRole::Author);

        assert!(engine.can_delete_user(&root, &admin));
        assert!(engine.can_delete_user(&admin, &author));
        assert!(!engine.can_delete_user(&admin, &root));
        assert!(!engine.can_delete_user(&author, &admin));
    }

    #[test]
    fn test_assign_role() {
        let engine = AuthorizationEngine::reference();
        let editorial = principal(UserRole::Editorial);

        assert!(engine.can_assign_role_to(&editorial, "author"));
        assert!(engine.can_assign_role_to(&editorial, "editorial"));
        assert_eq!(
            engine.decide_assign_role(&editorial, "contributor"),
            Decision::deny(DenyReason::RoleNotAssignable)
        );
        assert!(!engine.can_assign_role_to(&principal(UserRole::Admin), "root"));
        assert!(engine.can_assign_role_to(&principal(UserRole::Root), "root"));
        assert!(!engine.can_assign_role_to(&principal(UserRole::Root), "custom"));
    }

    #[test]
    fn test_assignable_roles() {
        let engine = AuthorizationEngine::reference();
        let admin = principal(UserRole::Admin);
        let roles: Vec<_> = engine.assignable_roles(&admin).into_iter().collect();
        assert_eq!(roles.len(), 6);
        assert!(!roles.contains(&UserRole::Root.id()));
    }

    #[test]
    fn test_role_definitions_are_root_only() {
        let engine = AuthorizationEngine::reference();
        let root = principal(UserRole::Root);
        let admin = principal(UserRole::Admin);
        let custom = role("moderator");

        assert!(engine.can_manage_role(&root, None));
        assert!(engine.can_manage_role(&root, Some(&custom)));
        assert!(engine.can_view_any_roles(&root));
        assert!(engine.can_create_role(&root));
        assert!(engine.can_update_role(&root, &role("admin")));

        assert!(!engine.can_manage_role(&admin, None));
        assert!(!engine.can_manage_role(&admin, Some(&custom)));
        assert!(!engine.can_view_role(&admin, &custom));
        assert!(!engine.can_create_role(&admin));
    }

    #[test]
    fn test_delete_role() {
        let engine = AuthorizationEngine::reference();
        let root = principal(UserRole::Root);
        let admin = principal(UserRole::Admin);

        assert_eq!(
            engine.decide_delete_role(&root, Some(&role("root"))),
            Decision::deny(DenyReason::ProtectedRole)
        );
        assert!(!engine.can_delete_role(&root, Some(&role("admin"))));
        assert!(engine.can_delete_role(&root, Some(&role("custom-non-protected"))));
        assert!(engine.can_delete_role(&root, Some(&role("subscriber"))));
        assert_eq!(
            engine.decide_delete_role(&root, None),
            Decision::deny(DenyReason::MissingTarget)
        );
        assert_eq!(
            engine.decide_delete_role(&admin, Some(&role("subscriber"))),
            Decision::deny(DenyReason::RootOnly)
        );
    }

    #[test]
    fn test_unknown_and_empty_roles_fail_closed() {
        let engine = AuthorizationEngine::reference();
        let nobody = Principal::without_roles(Uuid::now_v7());
        let bogus = Principal::new(Uuid::now_v7(), ["superuser"]);
        let target = principal(UserRole::Guest);

        for actor in [&nobody, &bogus] {
            assert!(!engine.can_manage_user(actor, &target));
            assert!(!engine.can_view_any_users(actor));
            assert!(!engine.can_create_user(actor));
            assert!(!engine.can_assign_role_to(actor, "guest"));
            assert!(!engine.can_manage_role(actor, None));
            assert!(!engine.can_delete_role(actor, Some(&role("guest"))));
            assert!(!engine.can_access_admin(actor));
            assert!(engine.assignable_roles(actor).is_empty());
        }
    }

    #[test]
    fn test_authorize_user_dispatch() {
        let engine = AuthorizationEngine::reference();
        let admin = principal(UserRole::Admin);
        let root = principal(UserRole::Root);
        let author = principal(UserRole::Author);

        assert!(engine.authorize_user(&admin, Ability::ViewAny, None).is_allowed());
        assert!(engine.authorize_user(&admin, Ability::Create, None).is_allowed());
        assert!(engine.authorize_user(&author, Ability::Create, None).is_denied());
        assert_eq!(
            engine.authorize_user(&admin, Ability::View, None),
            Decision::deny(DenyReason::MissingTarget)
        );
        assert!(engine.authorize_user(&admin, Ability::Update, Some(&author)).is_allowed());
        assert!(engine.authorize_user(&admin, Ability::Delete, Some(&root)).is_denied());
        assert_eq!(
            engine.authorize_user(&admin, Ability::ForceDelete, Some(&admin)),
            Decision::deny(DenyReason::SelfDeletion)
        );
    }

    #[test]
    fn test_authorize_role_dispatch() {
        let engine = AuthorizationEngine::reference();
        let root = principal(UserRole::Root);

        assert!(engine.authorize_role(&root, Ability::ViewAny, None).is_allowed());
        assert!(engine.authorize_role(&root, Ability::Create, None).is_allowed());
        assert_eq!(
            engine.authorize_role(&root, Ability::Update, None),
            Decision::deny(DenyReason::MissingTarget)
        );
        assert!(engine
            .authorize_role(&root, Ability::Delete, Some(&role("editorial")))
            .is_allowed());
        assert_eq!(
            engine.authorize_role(&root, Ability::ForceDelete, Some(&role("root"))),
            Decision::deny(DenyReason::ProtectedRole)
        );
    }

    #[test]
    fn test_admin_access() {
        let engine = AuthorizationEngine::reference();
        assert!(engine.can_access_admin(&principal(UserRole::Contributor)));
        assert!(engine.can_access_admin(&principal(UserRole::Editorial)));
        assert_eq!(
            engine.decide_access_admin(&principal(UserRole::Subscriber)),
            Decision::deny(DenyReason::NoAdminAccess)
        );
        assert!(!engine.can_access_admin(&principal(UserRole::Guest)));
    }

    #[test]
    fn test_decisions_are_idempotent() {
        let engine = AuthorizationEngine::reference();
        let admin = principal(UserRole::Admin);
        let root = principal(UserRole::Root);
        let protected = role("admin");

        for _ in 0..3 {
            assert!(!engine.can_manage_user(&admin, &root));
            assert!(engine.can_manage_user(&root, &admin));
            assert!(!engine.can_delete_role(&root, Some(&protected)));
        }
    }

    #[test]
    fn test_from_config() {
        let json = r#"{
            "top_role": "owner",
            "user_manager_roles": ["owner", "manager"],
            "protected_roles": ["owner"],
            "admin": {"roles": ["owner", "manager"]},
            "hierarchy": {
                "owner": ["owner", "manager", "member"],
                "manager": ["manager", "member"],
                "member": ["member"]
            }
        }"#;
        let config = RbacConfig::from_json_str(json).unwrap();
        let engine = AuthorizationEngine::from_config(&config).unwrap();

        let owner = Principal::with_role(Uuid::now_v7(), "owner");
        let manager = Principal::with_role(Uuid::now_v7(), "manager");

        assert!(engine.can_manage_user(&owner, &manager));
        assert!(!engine.can_manage_user(&manager, &owner));
        assert!(engine.can_assign_role_to(&manager, "member"));
        assert!(!engine.can_assign_role_to(&manager, "owner"));
        assert!(!engine.can_delete_role(&owner, Some(&role("owner"))));
        assert!(engine.can_delete_role(&owner, Some(&role("manager"))));
        assert!(!engine.can_manage_role(&manager, None));
    }

    #[test]
    fn test_from_invalid_config() {
        let mut config = RbacConfig::default();
        config.hierarchy.remove(&UserRole::Root.id());
        assert!(AuthorizationEngine::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_engine_is_shareable_across_tasks() {
        let engine = AuthorizationEngine::reference();
        let root = principal(UserRole::Root);
        let admin = principal(UserRole::Admin);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                let root = root.clone();
                let admin = admin.clone();
                tokio::spawn(async move {
                    (engine.can_manage_user(&root, &admin), engine.can_manage_user(&admin, &root))
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), (true, false));
        }
    }
}
