use std::collections::BTreeSet;

use rolegate_core::{AppError, AppResult, RoleId, UserId};
use rolegate_domain::{PermissionCode, RbacEvent, Role};

use super::RbacManager;
use crate::rbac_ports::{NewRole, RoleListQuery, UpdateRole};

impl RbacManager {
    /// Creates a role and emits `rbac.role.created`.
    pub async fn create_role(&self, actor: UserId, input: NewRole) -> AppResult<Role> {
        let role = Role {
            id: RoleId::new(),
            name: input.name.into(),
            scope: input.scope,
            allow_override: input.allow_override,
            description: input.description,
            permissions: BTreeSet::new(),
        };

        let role = self.roles.create_role(role).await?;

        self.publisher
            .publish(RbacEvent::RoleCreated {
                actor,
                role: role.clone(),
            })
            .await?;

        Ok(role)
    }

    /// Returns one role by id.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Lists roles with optional scope filter and offset pagination.
    pub async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        self.roles.list_roles(query).await
    }

    /// Updates name, description or override flag of a role and emits
    /// `rbac.role.updated` with before/after state. Scope is immutable, and
    /// an absent description leaves the stored one in place (a description
    /// can be replaced, never cleared).
    pub async fn update_role(
        &self,
        actor: UserId,
        role_id: RoleId,
        input: UpdateRole,
    ) -> AppResult<Role> {
        let before = self.get_role(role_id).await?;

        let mut after = before.clone();
        if let Some(name) = input.name {
            after.name = name.into();
        }
        if let Some(allow_override) = input.allow_override {
            after.allow_override = allow_override;
        }
        if let Some(description) = input.description {
            after.description = Some(description);
        }

        if after == before {
            return Ok(before);
        }

        self.roles.update_role(&after).await?;

        self.publisher
            .publish(RbacEvent::RoleUpdated {
                actor,
                before,
                after: after.clone(),
            })
            .await?;

        Ok(after)
    }

    /// Replaces a role's entire permission set atomically and emits
    /// `rbac.role.permissions.synced` with before/after sets.
    ///
    /// Fails with `UnknownPermissions` listing every code missing from the
    /// catalog; partial application never happens.
    pub async fn sync_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        codes: BTreeSet<PermissionCode>,
    ) -> AppResult<Role> {
        let outcome = self.roles.sync_role_permissions(role_id, codes).await?;

        self.publisher
            .publish(RbacEvent::RolePermissionsSynced {
                actor,
                role_id: outcome.role.id,
                role_name: outcome.role.name.clone(),
                before: outcome.previous,
                after: outcome.role.permissions.clone(),
            })
            .await?;

        Ok(outcome.role)
    }

    /// Deletes a role and emits `rbac.role.deleted`.
    ///
    /// Fails with `RoleInUse` while any assignment, in any of the three
    /// relations, still references the role.
    pub async fn delete_role(&self, actor: UserId, role_id: RoleId) -> AppResult<()> {
        let role = self.roles.delete_role(role_id).await?;

        self.publisher
            .publish(RbacEvent::RoleDeleted { actor, role })
            .await
    }

    /// Lists the permission catalog.
    pub async fn list_permission_codes(&self) -> AppResult<BTreeSet<PermissionCode>> {
        self.roles.list_permission_codes().await
    }
}
