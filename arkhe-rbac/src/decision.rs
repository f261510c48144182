//! Authorization decisions
//!
//! A decision is a boolean plus, when denied, the rule that denied it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Actor holds no user-manager role
    NotAdministrator,

    /// Target holds the top role and actor does not
    RootTargetRequiresRoot,

    /// Actor tried to delete their own account
    SelfDeletion,

    /// Role is outside the actor's allowed-roles set
    RoleNotAssignable,

    /// Only the top role may do this
    RootOnly,

    /// Role is protected against deletion
    ProtectedRole,

    /// A target was required but none was given
    MissingTarget,

    /// Actor holds no role with administration access
    NoAdminAccess,

    /// Denied without a recorded rule
    Unspecified,
}

impl DenyReason {
    /// Get error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotAdministrator => "NOT_ADMINISTRATOR",
            DenyReason::RootTargetRequiresRoot => "ROOT_TARGET_REQUIRES_ROOT",
            DenyReason::SelfDeletion => "SELF_DELETION",
            DenyReason::RoleNotAssignable => "ROLE_NOT_ASSIGNABLE",
            DenyReason::RootOnly => "ROOT_ONLY",
            DenyReason::ProtectedRole => "PROTECTED_ROLE",
            DenyReason::MissingTarget => "MISSING_TARGET",
            DenyReason::NoAdminAccess => "NO_ADMIN_ACCESS",
            DenyReason::Unspecified => "DENIED",
        }
    }

    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            DenyReason::NotAdministrator => "only administrators can manage users",
            DenyReason::RootTargetRequiresRoot => "only root can manage root users",
            DenyReason::SelfDeletion => "you cannot delete your own account",
            DenyReason::RoleNotAssignable => "you are not allowed to assign this role",
            DenyReason::RootOnly => "only root can manage roles",
            DenyReason::ProtectedRole => "protected system roles cannot be deleted",
            DenyReason::MissingTarget => "no target was given",
            DenyReason::NoAdminAccess => "administration access is not granted to your role",
            DenyReason::Unspecified => "access denied",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of an authorization check.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::{Decision, DenyReason};
///
/// assert!(Decision::allow().is_allowed());
///
/// let denied = Decision::deny(DenyReason::SelfDeletion);
/// assert!(!denied.is_allowed());
/// assert_eq!(denied.reason, Some(DenyReason::SelfDeletion));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawDecision")]
pub struct Decision {
    /// Whether the request is allowed
    pub allowed: bool,

    /// Denial reason (always `None` when allowed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl Decision {
    /// An allowing decision.
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// A denying decision.
    pub const fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// Check if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Check if the request is denied.
    pub fn is_denied(&self) -> bool {
        !self.allowed
    }

    /// Convert into a `Result`, yielding the denial reason as the error.
    ///
    /// A denial without a reason is still a denial, reported as
    /// [`DenyReason::Unspecified`].
    pub fn into_result(self) -> Result<(), DenyReason> {
        if self.allowed {
            Ok(())
        } else {
            Err(self.reason.unwrap_or(DenyReason::Unspecified))
        }
    }

    /// Evaluate `next` only if this decision allows.
    pub fn and_then(self, next: impl FnOnce() -> Decision) -> Decision {
        if self.allowed {
            next()
        } else {
            self
        }
    }
}

#[derive(Deserialize)]
struct RawDecision {
    allowed: bool,
    #[serde(default)]
    reason: Option<DenyReason>,
}

impl TryFrom<RawDecision> for Decision {
    type Error = String;

    fn try_from(raw: RawDecision) -> Result<Self, Self::Error> {
        match (raw.allowed, raw.reason) {
            (true, Some(reason)) => Err(format!("allowed decision carries deny reason '{}'", reason.code())),
            (allowed, reason) => Ok(Self { allowed, reason }),
        }
    }
}

impl From<Decision> for bool {
    fn from(decision: Decision) -> Self {
        decision.allowed
    }
}
