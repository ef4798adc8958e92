use std::collections::HashMap;
use std::str::FromStr;

use sqlx::{FromRow, PgPool};

use rolegate_core::{AppError, AppResult, RoleId};
use rolegate_domain::{PermissionCode, Role, RoleScope};

mod assignments;
mod roles;

/// PostgreSQL-backed implementation of the role and assignment ports.
///
/// Multi-step writes (`sync_role_permissions`, `delete_role`) run inside a
/// single transaction so concurrent resolvers observe either the old or the
/// new state, never a partial one. The assignment tables keep an
/// `ON DELETE RESTRICT` foreign key to `rbac_roles` as a backstop for the
/// delete-versus-assign race.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: uuid::Uuid,
    role_name: String,
    scope: String,
    allow_override: bool,
    description: Option<String>,
    permission: Option<String>,
}

fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    let mut by_id: HashMap<uuid::Uuid, Role> = HashMap::new();

    for row in rows {
        let scope = RoleScope::from_str(row.scope.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored scope '{}' for role '{}': {error}",
                row.scope, row.role_id
            ))
        })?;

        let role = by_id.entry(row.role_id).or_insert_with(|| Role {
            id: RoleId::from_uuid(row.role_id),
            name: row.role_name.clone(),
            scope,
            allow_override: row.allow_override,
            description: row.description.clone(),
            permissions: std::collections::BTreeSet::new(),
        });

        if let Some(permission_value) = row.permission {
            let code = PermissionCode::new(permission_value.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored permission '{}' for role '{}': {error}",
                    permission_value, row.role_id
                ))
            })?;

            role.permissions.insert(code);
        }
    }

    let mut roles = by_id.into_values().collect::<Vec<_>>();
    roles.sort_by(|left, right| {
        left.name
            .cmp(&right.name)
            .then_with(|| left.scope.cmp(&right.scope))
    });
    Ok(roles)
}

fn single_role(rows: Vec<RoleRow>) -> AppResult<Option<Role>> {
    Ok(aggregate_roles(rows)?.into_iter().next())
}

fn pagination_arg(value: usize, name: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("{name} '{value}' is out of range")))
}

fn map_role_conflict(error: sqlx::Error, name: &str, scope: RoleScope) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::DuplicateRole {
            name: name.to_owned(),
            scope: scope.as_str().to_owned(),
        };
    }

    AppError::Internal(format!("failed to persist role: {error}"))
}
