use chrono::Utc;
use rolegate_core::{AppResult, ProjectId, RoleId, UserId};
use rolegate_domain::{
    CustomRoleAssignment, ProjectRoleAssignment, RbacEvent, RoleScope, SystemRoleAssignment,
};

use super::RbacManager;

impl RbacManager {
    /// Assigns a system-scope role to a user.
    ///
    /// Fails with `ScopeMismatch` unless the role carries system scope.
    /// Re-assigning an already-held role is a no-op success.
    pub async fn assign_system_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let role = self
            .require_role_with_scope(role_id, RoleScope::System)
            .await?;

        let inserted = self
            .assignments
            .insert_system_assignment(SystemRoleAssignment {
                user_id,
                role_id: role.id,
                assigned_by: actor,
                assigned_at: Utc::now(),
            })
            .await?;

        if inserted {
            self.publish_assignment_created(actor, user_id, role.id, RoleScope::System, None)
                .await?;
        }

        Ok(())
    }

    /// Assigns a custom-scope (tenant-level) role to a user.
    pub async fn assign_custom_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let role = self
            .require_role_with_scope(role_id, RoleScope::Custom)
            .await?;

        let inserted = self
            .assignments
            .insert_custom_assignment(CustomRoleAssignment {
                user_id,
                role_id: role.id,
                assigned_by: actor,
                assigned_at: Utc::now(),
            })
            .await?;

        if inserted {
            self.publish_assignment_created(actor, user_id, role.id, RoleScope::Custom, None)
                .await?;
        }

        Ok(())
    }

    /// Assigns a project-scope role to a user within one project.
    pub async fn assign_project_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        let role = self
            .require_role_with_scope(role_id, RoleScope::Project)
            .await?;

        let inserted = self
            .assignments
            .insert_project_assignment(ProjectRoleAssignment {
                user_id,
                role_id: role.id,
                project_id,
                assigned_by: actor,
                assigned_at: Utc::now(),
            })
            .await?;

        if inserted {
            self.publish_assignment_created(
                actor,
                user_id,
                role.id,
                RoleScope::Project,
                Some(project_id),
            )
            .await?;
        }

        Ok(())
    }

    /// Removes a system-scope assignment. Removing a missing assignment is a
    /// no-op success.
    pub async fn unassign_system_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let removed = self
            .assignments
            .remove_system_assignment(user_id, role_id)
            .await?;

        if removed {
            self.publish_assignment_removed(actor, user_id, role_id, RoleScope::System, None)
                .await?;
        }

        Ok(())
    }

    /// Removes a custom-scope assignment.
    pub async fn unassign_custom_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let removed = self
            .assignments
            .remove_custom_assignment(user_id, role_id)
            .await?;

        if removed {
            self.publish_assignment_removed(actor, user_id, role_id, RoleScope::Custom, None)
                .await?;
        }

        Ok(())
    }

    /// Removes a project-scope assignment.
    pub async fn unassign_project_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        let removed = self
            .assignments
            .remove_project_assignment(user_id, role_id, project_id)
            .await?;

        if removed {
            self.publish_assignment_removed(
                actor,
                user_id,
                role_id,
                RoleScope::Project,
                Some(project_id),
            )
            .await?;
        }

        Ok(())
    }

    async fn publish_assignment_created(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
        scope: RoleScope,
        project_id: Option<ProjectId>,
    ) -> AppResult<()> {
        self.publisher
            .publish(RbacEvent::AssignmentCreated {
                actor,
                user_id,
                role_id,
                scope,
                project_id,
            })
            .await
    }

    async fn publish_assignment_removed(
        &self,
        actor: UserId,
        user_id: UserId,
        role_id: RoleId,
        scope: RoleScope,
        project_id: Option<ProjectId>,
    ) -> AppResult<()> {
        self.publisher
            .publish(RbacEvent::AssignmentRemoved {
                actor,
                user_id,
                role_id,
                scope,
                project_id,
            })
            .await
    }
}
