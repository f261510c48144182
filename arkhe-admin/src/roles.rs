//! Role definition administration
//!
//! Defining, editing and deleting roles is reserved to the top role.
//! Protected roles are refused twice: by the policy in [`RoleService::delete`]
//! and again by the storage guard shared with [`RoleService::delete_unchecked`],
//! so no code path can remove them.

use std::sync::Arc;

use arkhe_events::{AdminEvent, EventBus};
use arkhe_rbac::{AuthorizationEngine, Principal, PrincipalId, Role};
use tracing::info;

use crate::dto::RoleDto;
use crate::error::{AdminError, AdminResult};
use crate::notify;
use crate::store::{RoleStore, UserStore};

/// Policy-checked role management.
#[derive(Clone)]
pub struct RoleService {
    engine: AuthorizationEngine,
    roles: Arc<dyn RoleStore>,
    users: Arc<dyn UserStore>,
    events: Arc<dyn EventBus>,
}

impl RoleService {
    /// Create a new role service.
    pub fn new(
        engine: AuthorizationEngine,
        roles: Arc<dyn RoleStore>,
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            engine,
            roles,
            users,
            events,
        }
    }

    /// List every defined role.
    pub async fn list(&self, actor: &Principal) -> AdminResult<Vec<Role>> {
        self.engine.decide_manage_role(actor, None).into_result()?;
        self.roles.list().await
    }

    /// Fetch one role definition.
    pub async fn find(&self, actor: &Principal, role_id: &str) -> AdminResult<Role> {
        self.engine.decide_manage_role(actor, None).into_result()?;
        let role = self.load(role_id).await?;
        self.engine.decide_manage_role(actor, Some(&role)).into_result()?;
        Ok(role)
    }

    /// Define a new role.
    pub async fn create(&self, actor: &Principal, dto: RoleDto) -> AdminResult<Role> {
        self.engine.decide_manage_role(actor, None).into_result()?;
        dto.validate()?;

        if self.roles.find(dto.name.as_str()).await?.is_some() {
            return Err(AdminError::Conflict(format!("role {} already exists", dto.name)));
        }

        let role = Role::new(dto.name, dto.label.trim()).with_permissions(dto.permissions);
        self.roles.insert(role.clone()).await?;

        info!(actor_id = %actor.id, role_id = %role.id, "Role created");
        notify::publish(
            self.events.as_ref(),
            AdminEvent::RoleCreated {
                role_id: role.id.clone(),
                label: role.label.clone(),
                permissions: role.permissions.iter().map(String::from).collect(),
                created_by: Some(actor.id),
            },
        )
        .await;

        Ok(role)
    }

    /// Change a role's label and permissions.
    ///
    /// The identifier is immutable; a payload naming a different role is a
    /// validation error.
    pub async fn update(&self, actor: &Principal, role_id: &str, dto: RoleDto) -> AdminResult<Role> {
        self.engine.decide_manage_role(actor, None).into_result()?;
        let mut role = self.load(role_id).await?;
        self.engine.decide_manage_role(actor, Some(&role)).into_result()?;
        dto.validate()?;

        if dto.name != role.id {
            return Err(AdminError::validation("name", "role identifiers cannot be changed"));
        }

        role.label = dto.label.trim().to_string();
        role.permissions = dto.permissions;
        self.roles.update(role.clone()).await?;

        info!(actor_id = %actor.id, role_id = %role.id, "Role updated");
        notify::publish(
            self.events.as_ref(),
            AdminEvent::RoleUpdated {
                role_id: role.id.clone(),
                label: role.label.clone(),
                permissions: role.permissions.iter().map(String::from).collect(),
                updated_by: Some(actor.id),
            },
        )
        .await;

        Ok(role)
    }

    /// Delete a role after checking the policy.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `Forbidden(RootOnly)` if the actor does not hold the top role
    /// - `Forbidden(ProtectedRole)` for protected roles
    pub async fn delete(&self, actor: &Principal, role_id: &str) -> AdminResult<()> {
        self.engine.decide_manage_role(actor, None).into_result()?;
        let role = self.load(role_id).await?;
        self.engine.decide_delete_role(actor, Some(&role)).into_result()?;
        self.remove(role, Some(actor.id)).await
    }

    /// Delete a role without a policy check, for system tasks.
    ///
    /// Protected roles are still refused with [`AdminError::ProtectedRole`].
    pub async fn delete_unchecked(&self, role_id: &str) -> AdminResult<()> {
        let role = self.load(role_id).await?;
        self.remove(role, None).await
    }

    /// Defined roles `actor` may grant to users.
    ///
    /// Not policy-gated: an actor with no assignment rights gets an empty list.
    pub async fn roles_for(&self, actor: &Principal) -> AdminResult<Vec<Role>> {
        let assignable = self.engine.assignable_roles(actor);
        if assignable.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .roles
            .list()
            .await?
            .into_iter()
            .filter(|role| assignable.contains(&role.id))
            .collect())
    }

    async fn load(&self, role_id: &str) -> AdminResult<Role> {
        self.roles
            .find(role_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("role {role_id}")))
    }

    /// Revoke `role` from its holders, then drop the definition and its
    /// grants. A failure before the final step leaves the definition intact.
    async fn remove(&self, role: Role, actor: Option<PrincipalId>) -> AdminResult<()> {
        if self.engine.protected_roles().is_protected(role.id.as_str()) {
            return Err(AdminError::ProtectedRole(role.id));
        }

        let revoked = self.users.remove_role(role.id.as_str()).await?;

        if !self.roles.delete(role.id.as_str()).await? {
            return Err(AdminError::NotFound(format!("role {}", role.id)));
        }

        info!(role_id = %role.id, revoked, "Role deleted");
        notify::publish(
            self.events.as_ref(),
            AdminEvent::RoleDeleted {
                role_id: role.id,
                deleted_by: actor,
            },
        )
        .await;

        Ok(())
    }
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
