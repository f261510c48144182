//! # Arkhe RBAC (Role-Based Access Control)
//!
//! This crate holds the authorization rules of the Arkhe user and role
//! administration: who may assign which role, who may view, edit or delete
//! which user or role, and which roles are protected from deletion.
//!
//! ## Overview
//!
//! The arkhe-rbac crate handles:
//! - **Roles**: Role identifiers and the seven built-in roles
//! - **Hierarchy**: Which roles a holder of a role may assign
//! - **Protected Roles**: Roles that can never be deleted
//! - **Permissions**: Permission identifiers granted to roles
//! - **Engine**: The decision functions used by administration screens
//!
//! ## Architecture
//!
//! ```text
//! RbacConfig (loaded once)
//!   ├─ RoleHierarchy ──────────┐
//!   └─ ProtectedRoleRegistry ──┴─→ AuthorizationEngine ─→ Decision
//!                                        ▲
//!                   Principal / Role ────┘ (supplied by the caller)
//! ```
//!
//! ## Role Hierarchy
//!
//! | Role | May assign |
//! |---|---|
//! | root | root, admin, editorial, author, contributor, subscriber, guest |
//! | admin | admin, editorial, author, contributor, subscriber, guest |
//! | editorial | editorial, author |
//! | author | author |
//! | contributor | contributor |
//! | subscriber | subscriber |
//! | guest | guest |
//!
//! ## Usage
//!
//! ```rust
//! use arkhe_rbac::{AuthorizationEngine, Principal, Role, UserRole};
//! use uuid::Uuid;
//!
//! let engine = AuthorizationEngine::reference();
//!
//! let editor = Principal::with_role(Uuid::now_v7(), UserRole::Editorial);
//! assert!(engine.can_assign_role_to(&editor, "author"));
//! assert!(!engine.can_assign_role_to(&editor, "contributor"));
//!
//! let root = Principal::with_role(Uuid::now_v7(), UserRole::Root);
//! assert!(engine.can_delete_role(&root, Some(&Role::new("subscriber", "Subscriber"))));
//! assert!(!engine.can_delete_role(&root, Some(&Role::new("root", "Root"))));
//! ```
//!
//! ## Fail-Closed
//!
//! Decisions never error. Unknown roles, empty role sets and missing targets
//! all produce a denial.

pub mod abilities;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod permissions;
pub mod principal;
pub mod protected;
pub mod roles;

// Re-export main types for convenience
pub use abilities::Ability;
pub use config::{AdminConfig, RbacConfig};
pub use decision::{Decision, DenyReason};
pub use engine::AuthorizationEngine;
pub use error::{RbacError, RbacResult};
pub use hierarchy::RoleHierarchy;
pub use permissions::PermissionSet;
pub use principal::{Principal, PrincipalId, Role};
pub use protected::ProtectedRoleRegistry;
pub use roles::{RoleId, UserRole};
