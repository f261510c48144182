//! User administration
//!
//! Every operation asks the [`AuthorizationEngine`] first, then touches
//! storage, then publishes the matching [`AdminEvent`]. Operations on an
//! existing account check the actor's own rights before the account is
//! looked up, so non-administrators cannot probe which ids exist.

use std::sync::Arc;

use arkhe_events::{AdminEvent, EventBus};
use arkhe_rbac::{AuthorizationEngine, Principal, PrincipalId, Role};
use tracing::info;

use crate::dto::UserDto;
use crate::error::{AdminError, AdminResult};
use crate::notify;
use crate::store::{RoleStore, UserRecord, UserStore};

/// Policy-checked user management.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use arkhe_admin::{MemoryRoleStore, MemoryUserStore, UserDto, UserService};
/// use arkhe_events::MemoryEventBus;
/// use arkhe_rbac::{AuthorizationEngine, Principal, RbacConfig, UserRole};
/// use uuid::Uuid;
///
/// # #[tokio::main]
/// # async fn main() {
/// let service = UserService::new(
///     AuthorizationEngine::reference(),
///     Arc::new(MemoryUserStore::new()),
///     Arc::new(MemoryRoleStore::with_builtin_roles(&RbacConfig::default())),
///     Arc::new(MemoryEventBus::new()),
/// );
///
/// let admin = Principal::with_role(Uuid::now_v7(), UserRole::Admin);
/// let user = service
///     .create(&admin, UserDto::new("Doe", "jane@example.com", "author"))
///     .await
///     .unwrap();
/// assert!(user.principal().has_role("author"));
///
/// // admins cannot mint root accounts
/// let err = service
///     .create(&admin, UserDto::new("Doe", "john@example.com", "root"))
///     .await
///     .unwrap_err();
/// assert_eq!(err.error_code(), "ROLE_NOT_ASSIGNABLE");
/// # }
/// ```
#[derive(Clone)]
pub struct UserService {
    engine: AuthorizationEngine,
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    events: Arc<dyn EventBus>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(
        engine: AuthorizationEngine,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            engine,
            users,
            roles,
            events,
        }
    }

    /// List all users.
    pub async fn list(&self, actor: &Principal) -> AdminResult<Vec<UserRecord>> {
        self.engine.decide_administer_users(actor).into_result()?;
        self.users.list().await
    }

    /// Fetch one user.
    pub async fn find(&self, actor: &Principal, user_id: PrincipalId) -> AdminResult<UserRecord> {
        self.engine.decide_administer_users(actor).into_result()?;
        let user = self.load(user_id).await?;
        self.engine.decide_manage_user(actor, &user.principal()).into_result()?;
        Ok(user)
    }

    /// Create a user holding exactly `dto.role`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor may not create users or grant the role
    /// - `Validation` if the payload is malformed
    /// - `NotFound` if the role is not defined
    /// - `Conflict` if the e-mail is taken
    pub async fn create(&self, actor: &Principal, dto: UserDto) -> AdminResult<UserRecord> {
        self.engine.decide_administer_users(actor).into_result()?;
        dto.validate()?;
        self.engine
            .decide_assign_role(actor, dto.role.as_str())
            .into_result()?;
        self.ensure_role_exists(&dto).await?;
        self.ensure_email_free(&dto, None).await?;

        let user = UserRecord::from_dto(&dto);
        self.users.insert(user.clone()).await?;

        info!(actor_id = %actor.id, user_id = %user.id, role = %dto.role, "User created");
        self.publish(AdminEvent::UserCreated {
            user_id: user.id,
            email: user.email.clone(),
            role: Some(dto.role),
            created_by: Some(actor.id),
        })
        .await;

        Ok(user)
    }

    /// Update a user's profile and replace their roles with `dto.role`.
    pub async fn update(
        &self,
        actor: &Principal,
        user_id: PrincipalId,
        dto: UserDto,
    ) -> AdminResult<UserRecord> {
        self.engine.decide_administer_users(actor).into_result()?;
        let mut user = self.load(user_id).await?;
        self.engine.decide_manage_user(actor, &user.principal()).into_result()?;
        dto.validate()?;
        self.engine
            .decide_assign_role(actor, dto.role.as_str())
            .into_result()?;
        self.ensure_role_exists(&dto).await?;
        self.ensure_email_free(&dto, Some(user_id)).await?;

        user.apply(&dto);
        self.users.update(user.clone()).await?;

        info!(actor_id = %actor.id, user_id = %user.id, role = %dto.role, "User updated");
        self.publish(AdminEvent::UserUpdated {
            user_id: user.id,
            role: Some(dto.role),
            updated_by: Some(actor.id),
        })
        .await;

        Ok(user)
    }

    /// Delete a user. Actors can never delete themselves.
    pub async fn delete(&self, actor: &Principal, user_id: PrincipalId) -> AdminResult<()> {
        self.engine.decide_administer_users(actor).into_result()?;
        let user = self.load(user_id).await?;
        self.engine.decide_delete_user(actor, &user.principal()).into_result()?;

        if !self.users.delete(user_id).await? {
            return Err(AdminError::NotFound(format!("user {user_id}")));
        }

        info!(actor_id = %actor.id, user_id = %user_id, "User deleted");
        self.publish(AdminEvent::UserDeleted {
            user_id,
            deleted_by: Some(actor.id),
        })
        .await;

        Ok(())
    }

    /// Defined roles the actor may grant, for populating role pickers.
    pub async fn assignable_roles(&self, actor: &Principal) -> AdminResult<Vec<Role>> {
        self.engine.decide_administer_users(actor).into_result()?;
        let assignable = self.engine.assignable_roles(actor);
        Ok(self
            .roles
            .list()
            .await?
            .into_iter()
            .filter(|role| assignable.contains(&role.id))
            .collect())
    }

    async fn load(&self, user_id: PrincipalId) -> AdminResult<UserRecord> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("user {user_id}")))
    }

    async fn ensure_role_exists(&self, dto: &UserDto) -> AdminResult<()> {
        match self.roles.find(dto.role.as_str()).await? {
            Some(_) => Ok(()),
            None => Err(AdminError::NotFound(format!("role {}", dto.role))),
        }
    }

    async fn ensure_email_free(&self, dto: &UserDto, owner: Option<PrincipalId>) -> AdminResult<()> {
        match self.users.find_by_email(&dto.normalized_email()).await? {
            Some(existing) if Some(existing.id) != owner => Err(AdminError::Conflict(format!(
                "email {} is already taken",
                existing.email
            ))),
            _ => Ok(()),
        }
    }

    async fn publish(&self, event: AdminEvent) {
        notify::publish(self.events.as_ref(), event).await;
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
