//! Role identifiers and the built-in role set
//!
//! Role identifiers are plain strings owned by the storage layer. The seven
//! built-in roles are also available as the [`UserRole`] enum, which carries
//! their labels, privilege rank and the explicit assignment table.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a role (e.g. `"root"`, `"editorial"` or a custom id).
///
/// Identifiers are compared exactly as given; no case folding happens here,
/// so `"Root"` is an unknown role and receives no privileges.
///
/// # Examples
///
/// ```
/// use arkhe_rbac::RoleId;
///
/// let id = RoleId::new("editorial");
/// assert_eq!(id.as_str(), "editorial");
/// assert_eq!(id.to_string(), "editorial");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Create a role identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the identifier to a built-in role, if it names one.
    pub fn builtin(&self) -> Option<UserRole> {
        UserRole::parse(&self.0)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<UserRole> for RoleId {
    fn from(role: UserRole) -> Self {
        Self(role.as_str().to_string())
    }
}

impl Borrow<str> for RoleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RoleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Built-in user roles, from most to least privileged.
///
/// The hierarchy is: Root > Admin > Editorial > Author > Contributor > Subscriber > Guest
///
/// # Permission Model
///
/// - **Root**: Full control, including role definitions
/// - **Admin**: Manages every non-root user account
/// - **Editorial**: Editorial staff, may hand out the author role
/// - **Author**: Writes and publishes own content
/// - **Contributor**: Submits content for review
/// - **Subscriber**: Manages own subscription
/// - **Guest**: Manages own settings only
///
/// # Examples
///
/// ```
/// use arkhe_rbac::UserRole;
///
/// assert_eq!(UserRole::parse("editorial"), Some(UserRole::Editorial));
/// assert_eq!(UserRole::parse("unknown"), None);
/// assert!(UserRole::Root.outranks(UserRole::Admin));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Unrestricted access
    Root,

    /// User administration
    Admin,

    /// Editorial staff
    Editorial,

    /// Content author
    Author,

    /// Content contributor
    Contributor,

    /// Paying subscriber
    Subscriber,

    /// Registered guest
    Guest,
}

impl UserRole {
    /// All built-in roles, most privileged first.
    pub const ALL: [UserRole; 7] = [
        UserRole::Root,
        UserRole::Admin,
        UserRole::Editorial,
        UserRole::Author,
        UserRole::Contributor,
        UserRole::Subscriber,
        UserRole::Guest,
    ];

    /// Parse a built-in role from its identifier.
    ///
    /// Matching is exact. Anything that is not one of the seven identifiers
    /// yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "root" => Some(Self::Root),
            "admin" => Some(Self::Admin),
            "editorial" => Some(Self::Editorial),
            "author" => Some(Self::Author),
            "contributor" => Some(Self::Contributor),
            "subscriber" => Some(Self::Subscriber),
            "guest" => Some(Self::Guest),
            _ => None,
        }
    }

    /// Get the identifier of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Admin => "admin",
            Self::Editorial => "editorial",
            Self::Author => "author",
            Self::Contributor => "contributor",
            Self::Subscriber => "subscriber",
            Self::Guest => "guest",
        }
    }

    /// Get a human-readable label for the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use arkhe_rbac::UserRole;
    ///
    /// assert_eq!(UserRole::Editorial.label(), "Editorial");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Admin => "Admin",
            Self::Editorial => "Editorial",
            Self::Author => "Author",
            Self::Contributor => "Contributor",
            Self::Subscriber => "Subscriber",
            Self::Guest => "Guest",
        }
    }

    /// Privilege rank; higher is more privileged.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Root => 6,
            Self::Admin => 5,
            Self::Editorial => 4,
            Self::Author => 3,
            Self::Contributor => 2,
            Self::Subscriber => 1,
            Self::Guest => 0,
        }
    }

    /// Check if this role is strictly more privileged than `other`.
    pub fn outranks(&self, other: UserRole) -> bool {
        self.rank() > other.rank()
    }

    /// Roles a holder of this role may assign to other users.
    ///
    /// This is explicit data, not derived from [`rank`](Self::rank): editorial
    /// may hand out author, but author and contributor may only propagate
    /// themselves.
    ///
    /// # Examples
    ///
    /// ```
    /// use arkhe_rbac::UserRole;
    ///
    /// assert_eq!(
    ///     UserRole::Editorial.allowed_roles(),
    ///     &[UserRole::Editorial, UserRole::Author]
    /// );
    /// ```
    pub fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            Self::Root => &[
                Self::Root,
                Self::Admin,
                Self::Editorial,
                Self::Author,
                Self::Contributor,
                Self::Subscriber,
                Self::Guest,
            ],
            Self::Admin => &[
                Self::Admin,
                Self::Editorial,
                Self::Author,
                Self::Contributor,
                Self::Subscriber,
                Self::Guest,
            ],
            Self::Editorial => &[Self::Editorial, Self::Author],
            Self::Author => &[Self::Author],
            Self::Contributor => &[Self::Contributor],
            Self::Subscriber => &[Self::Subscriber],
            Self::Guest => &[Self::Guest],
        }
    }

    /// Get the role identifier for this built-in role.
    pub fn id(&self) -> RoleId {
        RoleId::from(*self)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
