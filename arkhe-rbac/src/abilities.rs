//! # Abilities
//!
//! The policy verbs administration screens ask about: listing, viewing,
//! creating, updating, deleting, restoring and force-deleting resources.

use serde::{Deserialize, Serialize};

/// A policy verb.
///
/// Abilities map one-to-one onto permission identifiers of the form
/// `{ability}-{resource}`, e.g. `view-any-user` or `force-delete-role`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Ability {
    /// List every resource of a kind.
    ViewAny,

    /// View a single resource.
    View,

    /// Create a new resource.
    Create,

    /// Modify an existing resource.
    Update,

    /// Remove a resource (soft delete).
    Delete,

    /// Restore a soft-deleted resource.
    Restore,

    /// Permanently remove a resource.
    ForceDelete,
}

impl Ability {
    /// Get the string representation of the ability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::ViewAny => "view-any",
            Ability::View => "view",
            Ability::Create => "create",
            Ability::Update => "update",
            Ability::Delete => "delete",
            Ability::Restore => "restore",
            Ability::ForceDelete => "force-delete",
        }
    }

    /// Parse an ability from its string form.
    ///
    /// Accepts kebab-case, snake_case and camelCase spellings, plus a few
    /// aliases.
    ///
    /// # Example
    ///
    /// ```
    /// use arkhe_rbac::Ability;
    ///
    /// assert_eq!(Ability::parse("viewAny"), Some(Ability::ViewAny));
    /// assert_eq!(Ability::parse("force_delete"), Some(Ability::ForceDelete));
    /// assert_eq!(Ability::parse("edit"), Some(Ability::Update));
    /// assert_eq!(Ability::parse("publish"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "viewany" | "list" | "index" => Some(Ability::ViewAny),
            "view" | "read" | "show" => Some(Ability::View),
            "create" | "store" | "add" => Some(Ability::Create),
            "update" | "edit" => Some(Ability::Update),
            "delete" | "remove" | "destroy" => Some(Ability::Delete),
            "restore" => Some(Ability::Restore),
            "forcedelete" => Some(Ability::ForceDelete),
            _ => None,
        }
    }

    /// Get all abilities.
    pub fn all() -> [Ability; 7] {
        [
            Ability::ViewAny,
            Ability::View,
            Ability::Create,
            Ability::Update,
            Ability::Delete,
            Ability::Restore,
            Ability::ForceDelete,
        ]
    }

    /// Check if the ability is about one specific resource instance.
    ///
    /// `ViewAny` and `Create` are class-level and take no target.
    pub fn requires_target(&self) -> bool {
        !matches!(self, Ability::ViewAny | Ability::Create)
    }

    /// Check if this is a destructive ability.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Ability::Delete | Ability::ForceDelete)
    }

    /// Build the permission identifier for this ability on `resource`.
    ///
    /// # Example
    ///
    /// ```
    /// use arkhe_rbac::Ability;
    ///
    /// assert_eq!(Ability::ViewAny.permission_for("user"), "view-any-user");
    /// ```
    pub fn permission_for(&self, resource: &str) -> String {
        format!("{}-{}", self.as_str(), resource)
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
