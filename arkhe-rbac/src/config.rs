//! RBAC configuration.
//!
//! Holds the role hierarchy, protected roles, administration access list and
//! the default permission grants. Configuration is loaded once at startup,
//! from a JSON file named by an environment variable or from the built-in
//! reference values, and is never re-read per decision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::abilities::Ability;
use crate::error::{RbacError, RbacResult};
use crate::hierarchy::RoleHierarchy;
use crate::permissions::{PermissionSet, WILDCARD};
use crate::protected::ProtectedRoleRegistry;
use crate::roles::{RoleId, UserRole};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "ARKHE_RBAC_CONFIG";

/// Environment variable overriding the administration URL prefix.
pub const ADMIN_PREFIX_ENV: &str = "ARKHE_ADMIN_PREFIX";

/// Complete RBAC configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// Administration area settings.
    pub admin: AdminConfig,

    /// The single role allowed to define roles.
    pub top_role: RoleId,

    /// Roles allowed to administer user accounts.
    pub user_manager_roles: Vec<RoleId>,

    /// Roles that can never be deleted.
    pub protected_roles: Vec<RoleId>,

    /// Role → roles its holders may assign.
    pub hierarchy: BTreeMap<RoleId, Vec<RoleId>>,

    /// Named groups of permissions (e.g. `manage-users`).
    pub permission_groups: BTreeMap<String, Vec<String>>,

    /// Default grants per role. Entries are `*`, a group name or a permission.
    pub role_permissions: BTreeMap<RoleId, Vec<String>>,
}

impl Default for RbacConfig {
    /// Returns the reference configuration.
    fn default() -> Self {
        let hierarchy = UserRole::ALL
            .iter()
            .map(|role| (role.id(), role.allowed_roles().iter().map(|r| r.id()).collect()))
            .collect();

        Self {
            admin: AdminConfig::default(),
            top_role: UserRole::Root.id(),
            user_manager_roles: vec![UserRole::Root.id(), UserRole::Admin.id()],
            protected_roles: vec![UserRole::Root.id(), UserRole::Admin.id()],
            hierarchy,
            permission_groups: default_permission_groups(),
            role_permissions: default_role_permissions(),
        }
    }
}

impl RbacConfig {
    /// Parse configuration from a JSON document.
    ///
    /// Missing keys fall back to the reference values.
    pub fn from_json_str(json: &str) -> RbacResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> RbacResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RbacError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ARKHE_RBAC_CONFIG`: Path to a JSON configuration file (default: built-in reference)
    /// - `ARKHE_ADMIN_PREFIX`: Administration URL prefix (default: administration)
    pub fn from_env() -> RbacResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };

        if let Ok(prefix) = std::env::var(ADMIN_PREFIX_ENV) {
            config.admin.prefix = prefix;
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RbacResult<()> {
        if self.top_role.as_str().trim().is_empty() {
            return Err(RbacError::BlankRoleId("top_role"));
        }
        if !self.hierarchy.contains_key(&self.top_role) {
            return Err(RbacError::UnknownTopRole(self.top_role.clone()));
        }

        check_role_list("user_manager_roles", &self.user_manager_roles, false)?;
        check_role_list("protected_roles", &self.protected_roles, true)?;
        check_role_list("admin.roles", &self.admin.roles, true)?;

        let hierarchy = self.role_hierarchy();
        hierarchy.validate()?;
        hierarchy.validate_top_role(self.top_role.as_str())
    }

    /// Build the role hierarchy described by this configuration.
    pub fn role_hierarchy(&self) -> RoleHierarchy {
        RoleHierarchy::from_table(
            self.hierarchy
                .iter()
                .map(|(role, grants)| (role.clone(), grants.iter().cloned())),
        )
    }

    /// Build the protected role registry described by this configuration.
    pub fn protected_registry(&self) -> ProtectedRoleRegistry {
        ProtectedRoleRegistry::new(self.protected_roles.iter().cloned())
    }

    /// Default permissions for `role`, with groups expanded.
    ///
    /// A group grant includes the group name itself as well as its members.
    /// Unknown roles get an empty set.
    ///
    /// # Example
    ///
    /// ```
    /// use arkhe_rbac::RbacConfig;
    ///
    /// let config = RbacConfig::default();
    /// assert!(config.permissions_for_role("root").is_wildcard());
    /// assert!(config.permissions_for_role("author").has("create-post"));
    /// assert!(config.permissions_for_role("nobody").is_empty());
    /// ```
    pub fn permissions_for_role(&self, role: &str) -> PermissionSet {
        let mut set = PermissionSet::new();
        let Some(grants) = self.role_permissions.get(role) else {
            return set;
        };

        for grant in grants {
            if let Some(members) = self.permission_groups.get(grant) {
                set.add(grant.clone());
                set.add_all(members.iter().cloned());
            } else {
                set.add(grant.clone());
            }
        }
        set
    }
}

fn check_role_list(name: &'static str, roles: &[RoleId], allow_empty: bool) -> RbacResult<()> {
    if !allow_empty && roles.is_empty() {
        return Err(RbacError::EmptyRoleList(name));
    }
    if roles.iter().any(|r| r.as_str().trim().is_empty()) {
        return Err(RbacError::BlankRoleId(name));
    }
    Ok(())
}

/// Administration area settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// URL prefix of the administration area.
    pub prefix: String,

    /// Roles allowed to enter the administration area.
    pub roles: Vec<RoleId>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            prefix: "administration".to_string(),
            roles: vec![
                UserRole::Root.id(),
                UserRole::Admin.id(),
                UserRole::Editorial.id(),
                UserRole::Author.id(),
                UserRole::Contributor.id(),
            ],
        }
    }
}

fn crud_group(singular: &str) -> Vec<String> {
    Ability::all()
        .iter()
        .map(|ability| ability.permission_for(singular))
        .collect()
}

fn default_permission_groups() -> BTreeMap<String, Vec<String>> {
    [
        ("posts", "post"),
        ("authors", "author"),
        ("categories", "category"),
        ("tags", "tag"),
        ("comments", "comment"),
        ("audios-videos", "audio-video"),
        ("press-reviews", "press-review"),
        ("events", "event"),
        ("products", "product"),
        ("promo-codes", "promo-code"),
        ("plans", "plan"),
        ("subscriptions", "subscription"),
        ("users", "user"),
        ("roles", "role"),
        ("customization", "customization"),
        ("settings", "setting"),
    ]
    .into_iter()
    .map(|(plural, singular)| (format!("manage-{plural}"), crud_group(singular)))
    .chain([
        (
            "manage-own-subscription".to_string(),
            vec![
                "create-own-subscription".to_string(),
                "update-own-subscription".to_string(),
                "delete-own-subscription".to_string(),
            ],
        ),
        (
            "manage-own-settings".to_string(),
            vec![
                "manage-own-address".to_string(),
                "manage-own-payment-method".to_string(),
            ],
        ),
    ])
    .collect()
}

fn grants(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_role_permissions() -> BTreeMap<RoleId, Vec<String>> {
    BTreeMap::from([
        (UserRole::Root.id(), grants(&[WILDCARD])),
        (UserRole::Admin.id(), grants(&[WILDCARD])),
        (
            UserRole::Editorial.id(),
            grants(&[
                "manage-posts",
                "manage-authors",
                "manage-categories",
                "manage-tags",
                "manage-comments",
                "manage-audios-videos",
                "manage-press-reviews",
                "manage-products",
                "manage-customization",
            ]),
        ),
        (
            UserRole::Author.id(),
            grants(&[
                "view-any-post",
                "view-post",
                "create-post",
                "update-post",
                "manage-categories",
                "manage-tags",
            ]),
        ),
        (
            UserRole::Contributor.id(),
            grants(&["view-any-post", "view-post", "create-post"]),
        ),
        (
            UserRole::Subscriber.id(),
            grants(&["manage-own-subscription", "manage-own-settings"]),
        ),
        (UserRole::Guest.id(), grants(&["manage-own-settings"])),
    ])
}
