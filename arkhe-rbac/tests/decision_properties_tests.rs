//! Property tests for the authorization decisions.
//!
//! Each test sweeps every built-in role (plus unknown and empty role sets)
//! through one rule of the engine:
//! 1. every hierarchy entry is reflexive
//! 2. assignment is contained by privilege and asymmetric
//! 3. self-deletion is refused for everyone
//! 4. only root may act on root
//! 5. role definitions are root-only, protected roles are never deletable
//! 6. decisions are pure

use std::collections::HashSet;

use arkhe_rbac::{
    Ability, AuthorizationEngine, DenyReason, Principal, RbacConfig, Role, RoleHierarchy, RoleId,
    UserRole,
};
use uuid::Uuid;

/// A principal holding `role`.
fn principal(role: UserRole) -> Principal {
    Principal::with_role(Uuid::now_v7(), role)
}

/// Role sets that hold no privilege at all.
fn unprivileged() -> Vec<Principal> {
    vec![
        Principal::without_roles(Uuid::now_v7()),
        Principal::with_role(Uuid::now_v7(), "superuser"),
        Principal::with_role(Uuid::now_v7(), "ROOT"),
        Principal::with_role(Uuid::now_v7(), ""),
    ]
}

#[test]
fn every_role_may_assign_itself() {
    let hierarchy = RoleHierarchy::reference();
    for role in UserRole::ALL {
        assert!(
            hierarchy.allowed_roles_for(role.as_str()).contains(role.as_str()),
            "{role} cannot assign itself"
        );
    }
}

#[test]
fn unknown_roles_assign_nothing() {
    let hierarchy = RoleHierarchy::reference();
    assert!(hierarchy.allowed_roles_for("unknown-role").is_empty());

    let none: HashSet<RoleId> = HashSet::new();
    for role in UserRole::ALL {
        assert!(!hierarchy.can_assign(&none, role.as_str()));
    }
}

#[test]
fn assignment_never_escalates() {
    let engine = AuthorizationEngine::reference();
    for actor_role in UserRole::ALL {
        let actor = principal(actor_role);
        for candidate in UserRole::ALL {
            if candidate.outranks(actor_role) {
                assert!(
                    !engine.can_assign_role_to(&actor, candidate.as_str()),
                    "{actor_role} may assign higher role {candidate}"
                );
            }
        }
    }
}

#[test]
fn assignment_is_asymmetric() {
    let engine = AuthorizationEngine::reference();
    let pairs = [
        (UserRole::Root, UserRole::Guest),
        (UserRole::Root, UserRole::Admin),
        (UserRole::Admin, UserRole::Editorial),
        (UserRole::Editorial, UserRole::Author),
    ];

    for (higher, lower) in pairs {
        assert!(engine.can_assign_role_to(&principal(higher), lower.as_str()));
        assert!(!engine.can_assign_role_to(&principal(lower), higher.as_str()));
    }
}

#[test]
fn editorial_carve_out() {
    let engine = AuthorizationEngine::reference();
    let editorial = principal(UserRole::Editorial);

    assert!(engine.can_assign_role_to(&editorial, "author"));
    assert!(!engine.can_assign_role_to(&editorial, "contributor"));
    assert!(!engine.can_assign_role_to(&editorial, "subscriber"));

    // author does not inherit editorial's reach downwards
    assert!(!engine.can_assign_role_to(&principal(UserRole::Author), "contributor"));
}

#[test]
fn self_deletion_is_refused_for_every_role() {
    let engine = AuthorizationEngine::reference();
    let actors = UserRole::ALL.into_iter().map(principal).chain(unprivileged());

    for actor in actors {
        assert!(!engine.can_delete_user(&actor, &actor));
        assert!(!engine.can_force_delete_user(&actor, &actor));

        let clone = actor.clone();
        let decision = engine.authorize_user(&actor, Ability::Delete, Some(&clone));
        assert_eq!(decision.reason, Some(DenyReason::SelfDeletion));
    }
}

#[test]
fn only_root_acts_on_root() {
    let engine = AuthorizationEngine::reference();
    let target = principal(UserRole::Root);

    for role in UserRole::ALL {
        let actor = principal(role);
        assert_eq!(
            engine.can_manage_user(&actor, &target),
            role == UserRole::Root,
            "{role} on root"
        );
    }
}

#[test]
fn user_management_is_limited_to_managers() {
    let engine = AuthorizationEngine::reference();
    let target = principal(UserRole::Guest);

    for role in UserRole::ALL {
        let actor = principal(role);
        let manager = matches!(role, UserRole::Root | UserRole::Admin);
        assert_eq!(engine.can_view_any_users(&actor), manager);
        assert_eq!(engine.can_update_user(&actor, &target), manager);
        assert_eq!(engine.can_delete_user(&actor, &target), manager);
    }

    for actor in unprivileged() {
        assert!(!engine.can_manage_user(&actor, &target));
        assert!(!engine.can_create_user(&actor));
    }
}

#[test]
fn role_definitions_are_root_only() {
    let engine = AuthorizationEngine::reference();
    let custom = Role::new("custom-non-protected", "Custom");

    for role in UserRole::ALL {
        let actor = principal(role);
        let is_root = role == UserRole::Root;
        assert_eq!(engine.can_manage_role(&actor, Some(&custom)), is_root);
        assert_eq!(engine.can_delete_role(&actor, Some(&custom)), is_root);
    }
}

#[test]
fn protected_roles_are_never_deletable() {
    let engine = AuthorizationEngine::reference();
    let root = principal(UserRole::Root);

    assert!(!engine.can_delete_role(&root, Some(&Role::new("root", "Root"))));
    assert!(!engine.can_delete_role(&root, Some(&Role::new("admin", "Admin"))));
    assert!(!engine.can_delete_role(&root, None));
    assert!(engine.can_delete_role(&root, Some(&Role::new("subscriber", "Subscriber"))));
}

#[test]
fn decisions_are_pure() {
    let engine = AuthorizationEngine::reference();
    let root = principal(UserRole::Root);
    let admin = principal(UserRole::Admin);
    let role = Role::new("editorial", "Editorial");

    for _ in 0..3 {
        assert!(engine.can_manage_user(&root, &admin));
        assert!(!engine.can_manage_user(&admin, &root));
        assert!(!engine.can_delete_role(&admin, Some(&role)));
        assert!(engine.can_delete_role(&root, Some(&role)));
    }
}

#[test]
fn configured_engine_matches_reference() {
    let configured = AuthorizationEngine::from_config(&RbacConfig::default()).unwrap();
    let reference = AuthorizationEngine::reference();

    for actor_role in UserRole::ALL {
        let actor = principal(actor_role);
        for candidate in UserRole::ALL {
            assert_eq!(
                configured.can_assign_role_to(&actor, candidate.as_str()),
                reference.can_assign_role_to(&actor, candidate.as_str())
            );
        }
        assert_eq!(configured.assignable_roles(&actor), reference.assignable_roles(&actor));
    }
}
