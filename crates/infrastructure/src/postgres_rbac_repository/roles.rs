use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::FromRow;

use rolegate_application::{RoleListQuery, RoleRepository, SyncOutcome};
use rolegate_core::{AppError, AppResult, RoleId};
use rolegate_domain::{PermissionCode, Role, RoleScope};

use super::{PostgresRbacRepository, RoleRow, aggregate_roles, map_role_conflict, single_role};

#[derive(Debug, FromRow)]
struct RoleHeaderRow {
    role_name: String,
    scope: String,
    allow_override: bool,
    description: Option<String>,
}

const ROLE_WITH_GRANTS_BY_ID: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.name AS role_name,
        roles.scope,
        roles.allow_override,
        roles.description,
        grants.permission_code AS permission
    FROM rbac_roles AS roles
    LEFT JOIN rbac_role_grants AS grants
        ON grants.role_id = roles.id
    WHERE roles.id = $1
    ORDER BY grants.permission_code
"#;

#[async_trait]
impl RoleRepository for PostgresRbacRepository {
    async fn create_role(&self, role: Role) -> AppResult<Role> {
        sqlx::query(
            r#"
            INSERT INTO rbac_roles (id, name, scope, allow_override, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.scope.as_str())
        .bind(role.allow_override)
        .bind(role.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name.as_str(), role.scope))?;

        Ok(role)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(ROLE_WITH_GRANTS_BY_ID)
            .bind(role_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        single_role(rows)
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_roles
            SET name = $2, allow_override = $3, description = $4
            WHERE id = $1
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.allow_override)
        .bind(role.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name.as_str(), role.scope))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id
            )));
        }

        Ok(())
    }

    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.scope,
                roles.allow_override,
                roles.description,
                grants.permission_code AS permission
            FROM (
                SELECT id, name, scope, allow_override, description
                FROM rbac_roles
                WHERE ($1::text IS NULL OR scope = $1)
                ORDER BY name, scope
                LIMIT $2 OFFSET $3
            ) AS roles
            LEFT JOIN rbac_role_grants AS grants
                ON grants.role_id = roles.id
            ORDER BY roles.name, roles.scope, grants.permission_code
            "#,
        )
        .bind(query.scope.map(|scope| scope.as_str()))
        .bind(super::pagination_arg(query.limit, "limit")?)
        .bind(super::pagination_arg(query.offset, "offset")?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        aggregate_roles(rows)
    }

    async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        codes: BTreeSet<PermissionCode>,
    ) -> AppResult<SyncOutcome> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let header = sqlx::query_as::<_, RoleHeaderRow>(
            r#"
            SELECT name AS role_name, scope, allow_override, description
            FROM rbac_roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let requested: Vec<String> = codes
            .iter()
            .map(|code| code.as_str().to_owned())
            .collect();

        let known: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT code
            FROM rbac_permissions
            WHERE code = ANY($1)
            "#,
        )
        .bind(&requested)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check permission catalog: {error}"))
        })?;

        let unknown: Vec<String> = requested
            .iter()
            .filter(|code| !known.contains(code))
            .cloned()
            .collect();

        if !unknown.is_empty() {
            // Dropping the transaction rolls everything back; nothing is
            // ever partially applied.
            return Err(AppError::UnknownPermissions(unknown));
        }

        let previous = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission_code
            FROM rbac_role_grants
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load prior grants: {error}")))?
        .into_iter()
        .map(|code| {
            PermissionCode::new(code.as_str()).map_err(|error| {
                AppError::Internal(format!("invalid stored permission '{code}': {error}"))
            })
        })
        .collect::<AppResult<BTreeSet<_>>>()?;

        sqlx::query(
            r#"
            DELETE FROM rbac_role_grants
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear grants: {error}")))?;

        for code in &codes {
            sqlx::query(
                r#"
                INSERT INTO rbac_role_grants (role_id, permission_code)
                VALUES ($1, $2)
                "#,
            )
            .bind(role_id.as_uuid())
            .bind(code.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to persist grant: {error}")))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        let scope = parse_stored_scope(header.scope.as_str(), role_id)?;

        Ok(SyncOutcome {
            role: Role {
                id: role_id,
                name: header.role_name,
                scope,
                allow_override: header.allow_override,
                description: header.description,
                permissions: codes,
            },
            previous,
        })
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<Role> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let header = sqlx::query_as::<_, RoleHeaderRow>(
            r#"
            SELECT name AS role_name, scope, allow_override, description
            FROM rbac_roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        // All three assignment relations are scanned; the foreign keys are
        // only the backstop.
        let assignment_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM rbac_system_user_roles WHERE role_id = $1)
                + (SELECT COUNT(*) FROM rbac_custom_user_roles WHERE role_id = $1)
                + (SELECT COUNT(*) FROM rbac_project_user_roles WHERE role_id = $1)
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count role references: {error}"))
        })?;

        if assignment_count > 0 {
            return Err(AppError::RoleInUse {
                role_id: role_id.to_string(),
                assignment_count: assignment_count as u64,
            });
        }

        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission_code
            FROM rbac_role_grants
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load grants: {error}")))?
        .into_iter()
        .map(|code| {
            PermissionCode::new(code.as_str()).map_err(|error| {
                AppError::Internal(format!("invalid stored permission '{code}': {error}"))
            })
        })
        .collect::<AppResult<BTreeSet<_>>>()?;

        sqlx::query("DELETE FROM rbac_role_grants WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete grants: {error}")))?;

        sqlx::query("DELETE FROM rbac_roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        let scope = parse_stored_scope(header.scope.as_str(), role_id)?;

        Ok(Role {
            id: role_id,
            name: header.role_name,
            scope,
            allow_override: header.allow_override,
            description: header.description,
            permissions,
        })
    }

    async fn list_permission_codes(&self) -> AppResult<BTreeSet<PermissionCode>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT code
            FROM rbac_permissions
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permission catalog: {error}"))
        })?
        .into_iter()
        .map(|code| {
            PermissionCode::new(code.as_str()).map_err(|error| {
                AppError::Internal(format!("invalid stored permission '{code}': {error}"))
            })
        })
        .collect()
    }
}

fn parse_stored_scope(value: &str, role_id: RoleId) -> AppResult<RoleScope> {
    value.parse().map_err(|error| {
        AppError::Internal(format!(
            "invalid stored scope '{value}' for role '{role_id}': {error}"
        ))
    })
}
