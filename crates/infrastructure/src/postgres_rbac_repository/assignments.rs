use async_trait::async_trait;

use rolegate_application::AssignmentRepository;
use rolegate_core::{AppError, AppResult, ProjectId, RoleId, UserId};
use rolegate_domain::{
    CustomRoleAssignment, ProjectRoleAssignment, Role, SystemRoleAssignment,
};

use super::{PostgresRbacRepository, RoleRow, aggregate_roles};

const SYSTEM_ROLES_FOR_USER: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.name AS role_name,
        roles.scope,
        roles.allow_override,
        roles.description,
        grants.permission_code AS permission
    FROM rbac_system_user_roles AS assignments
    INNER JOIN rbac_roles AS roles
        ON roles.id = assignments.role_id
    LEFT JOIN rbac_role_grants AS grants
        ON grants.role_id = roles.id
    WHERE assignments.user_id = $1
    ORDER BY roles.name, grants.permission_code
"#;

const CUSTOM_ROLES_FOR_USER: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.name AS role_name,
        roles.scope,
        roles.allow_override,
        roles.description,
        grants.permission_code AS permission
    FROM rbac_custom_user_roles AS assignments
    INNER JOIN rbac_roles AS roles
        ON roles.id = assignments.role_id
    LEFT JOIN rbac_role_grants AS grants
        ON grants.role_id = roles.id
    WHERE assignments.user_id = $1
    ORDER BY roles.name, grants.permission_code
"#;

const PROJECT_ROLES_FOR_USER: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.name AS role_name,
        roles.scope,
        roles.allow_override,
        roles.description,
        grants.permission_code AS permission
    FROM rbac_project_user_roles AS assignments
    INNER JOIN rbac_roles AS roles
        ON roles.id = assignments.role_id
    LEFT JOIN rbac_role_grants AS grants
        ON grants.role_id = roles.id
    WHERE assignments.user_id = $1
        AND assignments.project_id = $2
    ORDER BY roles.name, grants.permission_code
"#;

#[async_trait]
impl AssignmentRepository for PostgresRbacRepository {
    async fn insert_system_assignment(
        &self,
        assignment: SystemRoleAssignment,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO rbac_system_user_roles (user_id, role_id, assigned_by, assigned_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.assigned_by.as_uuid())
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign system role: {error}")))?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn insert_custom_assignment(
        &self,
        assignment: CustomRoleAssignment,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO rbac_custom_user_roles (user_id, role_id, assigned_by, assigned_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.assigned_by.as_uuid())
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign custom role: {error}")))?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn insert_project_assignment(
        &self,
        assignment: ProjectRoleAssignment,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO rbac_project_user_roles
                (user_id, role_id, project_id, assigned_by, assigned_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, role_id, project_id) DO NOTHING
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.project_id.as_uuid())
        .bind(assignment.assigned_by.as_uuid())
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign project role: {error}")))?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn remove_system_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_system_user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove system assignment: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn remove_custom_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_custom_user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove custom assignment: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn remove_project_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_project_user_roles
            WHERE user_id = $1 AND role_id = $2 AND project_id = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove project assignment: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_system_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(SYSTEM_ROLES_FOR_USER)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load system roles: {error}"))
            })?;

        aggregate_roles(rows)
    }

    async fn list_custom_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(CUSTOM_ROLES_FOR_USER)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load custom roles: {error}"))
            })?;

        aggregate_roles(rows)
    }

    async fn list_project_roles_for_user(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(PROJECT_ROLES_FOR_USER)
            .bind(user_id.as_uuid())
            .bind(project_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load project roles: {error}"))
            })?;

        aggregate_roles(rows)
    }
}
