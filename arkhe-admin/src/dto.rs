//! Input payloads for user and role administration
//!
//! Validation mirrors the edit forms: required fields, 255-character limits
//! and a basic e-mail shape check. Uniqueness is checked by the services
//! against storage.

use arkhe_rbac::{PermissionSet, RoleId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult};

/// Maximum length of free-text fields.
pub const MAX_FIELD_LEN: usize = 255;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid email regex")
});

/// User create/update payload.
///
/// Passwords are handled by the authentication flows and never travel
/// through this payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: String,

    /// E-mail address (unique)
    pub email: String,

    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,

    /// Civility / title
    pub civility: Option<String>,

    /// Profession
    pub profession: Option<String>,

    /// Role to grant; replaces any role currently held
    pub role: RoleId,
}

impl UserDto {
    /// Create a payload with the required fields only.
    pub fn new(last_name: impl Into<String>, email: impl Into<String>, role: impl Into<RoleId>) -> Self {
        Self {
            first_name: None,
            last_name: last_name.into(),
            email: email.into(),
            date_of_birth: None,
            civility: None,
            profession: None,
            role: role.into(),
        }
    }

    /// Set the given name.
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Validate the payload.
    ///
    /// # Example
    ///
    /// ```
    /// use arkhe_admin::UserDto;
    ///
    /// assert!(UserDto::new("Doe", "jane@example.com", "author").validate().is_ok());
    /// assert!(UserDto::new("Doe", "not-an-email", "author").validate().is_err());
    /// ```
    pub fn validate(&self) -> AdminResult<()> {
        required("last_name", &self.last_name)?;
        required("email", &self.email)?;
        required("role", self.role.as_str())?;

        optional("first_name", self.first_name.as_deref())?;
        optional("civility", self.civility.as_deref())?;
        optional("profession", self.profession.as_deref())?;

        if !is_valid_email(self.email.trim()) {
            return Err(AdminError::validation("email", "must be a valid email address"));
        }
        Ok(())
    }

    /// E-mail normalised for storage and uniqueness checks.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Role create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDto {
    /// Role identifier
    pub name: RoleId,

    /// Human-readable label
    pub label: String,

    /// Permissions to grant (replaces the current grants)
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl RoleDto {
    /// Create a payload without permissions.
    pub fn new(name: impl Into<RoleId>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            permissions: PermissionSet::new(),
        }
    }

    /// Set the permissions to grant.
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Validate the payload.
    pub fn validate(&self) -> AdminResult<()> {
        required("label", &self.label)?;
        required("name", self.name.as_str())?;

        if self.name.as_str().chars().any(char::is_whitespace) {
            return Err(AdminError::validation("name", "must not contain whitespace"));
        }
        if let Some(blank) = self.permissions.iter().find(|p| p.trim().is_empty()) {
            return Err(AdminError::validation(
                "permissions",
                format!("invalid permission '{blank}'"),
            ));
        }
        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> AdminResult<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(field, "is required"));
    }
    optional(field, Some(value))
}

fn optional(field: &'static str, value: Option<&str>) -> AdminResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_FIELD_LEN => Err(AdminError::validation(
            field,
            format!("must be less than {MAX_FIELD_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
