//! Storage abstractions for users and role definitions
//!
//! The services only talk to the [`UserStore`] and [`RoleStore`] traits.
//! In-memory implementations are provided for single-process deployments
//! and tests; database-backed stores implement the same traits.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use arkhe_rbac::{PermissionSet, Principal, PrincipalId, RbacConfig, Role, RoleId, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::UserDto;
use crate::error::{AdminError, AdminResult};

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID
    pub id: PrincipalId,

    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: String,

    /// E-mail address, lower-cased
    pub email: String,

    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,

    /// Civility / title
    pub civility: Option<String>,

    /// Profession
    pub profession: Option<String>,

    /// Granted roles
    #[serde(default)]
    pub roles: HashSet<RoleId>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Build a new record from a validated payload.
    pub fn from_dto(dto: &UserDto) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            first_name: dto.first_name.clone(),
            last_name: dto.last_name.trim().to_string(),
            email: dto.normalized_email(),
            date_of_birth: dto.date_of_birth,
            civility: dto.civility.clone(),
            profession: dto.profession.clone(),
            roles: HashSet::from([dto.role.clone()]),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite profile fields and replace the granted roles with the
    /// payload's single role.
    pub fn apply(&mut self, dto: &UserDto) {
        self.first_name = dto.first_name.clone();
        self.last_name = dto.last_name.trim().to_string();
        self.email = dto.normalized_email();
        self.date_of_birth = dto.date_of_birth;
        self.civility = dto.civility.clone();
        self.profession = dto.profession.clone();
        self.roles = HashSet::from([dto.role.clone()]);
        self.updated_at = Utc::now();
    }

    /// The authorization view of this user.
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.roles.iter().cloned())
    }

    /// Display name, `first last` when a first name is known.
    pub fn full_name(&self) -> String {
        match self.first_name.as_deref().map(str::trim) {
            Some(first) if !first.is_empty() => format!("{} {}", first, self.last_name),
            _ => self.last_name.clone(),
        }
    }
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by ID.
    async fn find(&self, id: PrincipalId) -> AdminResult<Option<UserRecord>>;

    /// Find a user by (lower-cased) e-mail.
    async fn find_by_email(&self, email: &str) -> AdminResult<Option<UserRecord>>;

    /// List all users.
    async fn list(&self) -> AdminResult<Vec<UserRecord>>;

    /// Insert a new user. Fails with `Conflict` if the ID or e-mail exists.
    async fn insert(&self, user: UserRecord) -> AdminResult<()>;

    /// Replace an existing user. Fails with `NotFound` if absent.
    async fn update(&self, user: UserRecord) -> AdminResult<()>;

    /// Remove a user, returning whether it existed.
    async fn delete(&self, id: PrincipalId) -> AdminResult<bool>;

    /// Revoke `role` from every user holding it, returning how many changed.
    async fn remove_role(&self, role: &str) -> AdminResult<usize>;
}

/// Role definition persistence.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Find a role by ID.
    async fn find(&self, id: &str) -> AdminResult<Option<Role>>;

    /// List all roles, sorted by ID.
    async fn list(&self) -> AdminResult<Vec<Role>>;

    /// Insert a new role. Fails with `Conflict` if the ID exists.
    async fn insert(&self, role: Role) -> AdminResult<()>;

    /// Replace an existing role. Fails with `NotFound` if absent.
    async fn update(&self, role: Role) -> AdminResult<()>;

    /// Remove a role together with its permission grants, returning whether
    /// it existed.
    async fn delete(&self, id: &str) -> AdminResult<bool>;
}

/// In-memory user store.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<PrincipalId, UserRecord>>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, id: PrincipalId) -> AdminResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AdminResult<Option<UserRecord>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> AdminResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn insert(&self, user: UserRecord) -> AdminResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AdminError::Conflict(format!("user {} already exists", user.id)));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(AdminError::Conflict(format!("email {} is already taken", user.email)));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn update(&self, user: UserRecord) -> AdminResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(AdminError::Conflict(format!("email {} is already taken", user.email)));
        }
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user;
                Ok(())
            }
            None => Err(AdminError::NotFound(format!("user {}", user.id))),
        }
    }

    async fn delete(&self, id: PrincipalId) -> AdminResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn remove_role(&self, role: &str) -> AdminResult<usize> {
        let mut users = self.users.write().await;
        let mut changed = 0;
        for user in users.values_mut() {
            if user.roles.remove(role) {
                user.updated_at = Utc::now();
                changed += 1;
            }
        }
        Ok(changed)
    }
}

/// In-memory role store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    roles: Arc<RwLock<BTreeMap<RoleId, Role>>>,
}

impl MemoryRoleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the built-in roles and the permissions
    /// `config` grants them.
    pub fn with_builtin_roles(config: &RbacConfig) -> Self {
        let roles = UserRole::ALL
            .iter()
            .map(|role| {
                let id = role.id();
                let permissions: PermissionSet = config.permissions_for_role(id.as_str());
                (id.clone(), Role::new(id, role.label()).with_permissions(permissions))
            })
            .collect();

        Self {
            roles: Arc::new(RwLock::new(roles)),
        }
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find(&self, id: &str) -> AdminResult<Option<Role>> {
        Ok(self.roles.read().await.get(id).cloned())
    }

    async fn list(&self) -> AdminResult<Vec<Role>> {
        Ok(self.roles.read().await.values().cloned().collect())
    }

    async fn insert(&self, role: Role) -> AdminResult<()> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(&role.id) {
            return Err(AdminError::Conflict(format!("role {} already exists", role.id)));
        }
        roles.insert(role.id.clone(), role);
        Ok(())
    }

    async fn update(&self, role: Role) -> AdminResult<()> {
        let mut roles = self.roles.write().await;
        match roles.get_mut(&role.id) {
            Some(existing) => {
                *existing = role;
                Ok(())
            }
            None => Err(AdminError::NotFound(format!("role {}", role.id))),
        }
    }

    async fn delete(&self, id: &str) -> AdminResult<bool> {
        Ok(self.roles.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, role: &str) -> UserRecord {
        UserRecord::from_dto(&UserDto::new("Doe", email, role))
    }

    #[tokio::test]
    async fn test_user_insert_and_find() {
        let store = MemoryUserStore::new();
        let user = record("Jane@Example.com", "author");
        let id = user.id;
        store.insert(user).await.unwrap();

        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.email, "jane@example.com");
        assert!(found.principal().has_role("author"));

        let by_email = store.find_by_email(" JANE@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn test_user_email_conflict() {
        let store = MemoryUserStore::new();
        store.insert(record("a@example.com", "author")).await.unwrap();
        let err = store.insert(record("a@example.com", "guest")).await.unwrap_err();
        assert!(matches!(err, AdminError::Conflict(_)));

        let mut other = record("b@example.com", "guest");
        store.insert(other.clone()).await.unwrap();
        other.email = "a@example.com".to_string();
        assert!(matches!(store.update(other).await, Err(AdminError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_user_update_missing() {
        let store = MemoryUserStore::new();
        let err = store.update(record("a@example.com", "author")).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_user_delete_and_remove_role() {
        let store = MemoryUserStore::new();
        let a = record("a@example.com", "moderator");
        let b = record("b@example.com", "moderator");
        let c = record("c@example.com", "author");
        let a_id = a.id;
        for user in [a, b, c] {
            store.insert(user).await.unwrap();
        }

        assert_eq!(store.remove_role("moderator").await.unwrap(), 2);
        assert!(store.find(a_id).await.unwrap().unwrap().roles.is_empty());

        assert!(store.delete(a_id).await.unwrap());
        assert!(!store.delete(a_id).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[test]
    fn test_apply_replaces_roles() {
        let mut user = record("a@example.com", "author");
        user.roles.insert(RoleId::new("editorial"));

        user.apply(&UserDto::new("Smith", "a@example.com", "contributor").with_first_name("Ann"));
        assert_eq!(user.roles, HashSet::from([RoleId::new("contributor")]));
        assert_eq!(user.full_name(), "Ann Smith");
    }

    #[tokio::test]
    async fn test_builtin_roles_seeded() {
        let store = MemoryRoleStore::with_builtin_roles(&RbacConfig::default());
        let roles = store.list().await.unwrap();
        assert_eq!(roles.len(), UserRole::ALL.len());

        let root = store.find("root").await.unwrap().unwrap();
        assert_eq!(root.label, "Root");
        assert!(root.permissions.is_wildcard());

        let contributor = store.find("contributor").await.unwrap().unwrap();
        assert!(!contributor.permissions.is_wildcard());
        assert!(!contributor.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_role_crud() {
        let store = MemoryRoleStore::new();
        store.insert(Role::new("moderator", "Moderator")).await.unwrap();
        assert!(matches!(
            store.insert(Role::new("moderator", "Other")).await,
            Err(AdminError::Conflict(_))
        ));

        store.update(Role::new("moderator", "Moderators")).await.unwrap();
        assert_eq!(store.find("moderator").await.unwrap().unwrap().label, "Moderators");
        assert!(matches!(
            store.update(Role::new("missing", "Missing")).await,
            Err(AdminError::NotFound(_))
        ));

        assert!(store.delete("moderator").await.unwrap());
        assert!(store.find("moderator").await.unwrap().is_none());
    }
}
