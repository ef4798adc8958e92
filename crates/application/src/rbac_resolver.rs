use std::sync::Arc;

use rolegate_core::{AppError, AppResult, ProjectId, UserId};
use rolegate_domain::{EffectivePermissions, PermissionCode};

use crate::rbac_ports::{AssignmentRepository, UserDirectory};

/// Read side of the RBAC engine: pure, side-effect-free resolution of the
/// permission set a user effectively holds.
///
/// Stateless and safe for arbitrary concurrent invocation; it performs only
/// reads against the assignment relations and keeps no in-process mutable
/// state. Callers on hot paths are expected to resolve once per request and
/// test membership repeatedly.
#[derive(Clone)]
pub struct RbacResolver {
    assignments: Arc<dyn AssignmentRepository>,
    directory: Arc<dyn UserDirectory>,
}

impl RbacResolver {
    /// Creates a resolver from repository and directory implementations.
    #[must_use]
    pub fn new(assignments: Arc<dyn AssignmentRepository>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            assignments,
            directory,
        }
    }

    /// Computes the effective permission set for a user, optionally narrowed
    /// to a project context.
    ///
    /// System-scope grants are always included; custom-scope grants are
    /// layered on top; project-scope grants contribute only when
    /// `project_id` is given. A user with zero assignments resolves to an
    /// empty set (deny by default). Fails with `UnknownUser` only when the
    /// platform does not know the identity at all, and surfaces any
    /// repository failure as a hard error rather than a partial union.
    pub async fn resolve(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> AppResult<EffectivePermissions> {
        if !self.directory.user_exists(user_id).await? {
            return Err(AppError::UnknownUser(user_id.to_string()));
        }

        let mut effective = EffectivePermissions::new();

        for role in self.assignments.list_system_roles_for_user(user_id).await? {
            effective.apply_role(&role);
        }

        for role in self.assignments.list_custom_roles_for_user(user_id).await? {
            effective.apply_role(&role);
        }

        if let Some(project_id) = project_id {
            for role in self
                .assignments
                .list_project_roles_for_user(user_id, project_id)
                .await?
            {
                effective.apply_role(&role);
            }
        }

        Ok(effective)
    }

    /// Returns whether the user holds the permission, optionally within a
    /// project context.
    ///
    /// Deliberately unmemoized; this is a membership test over a fresh
    /// `resolve`.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        code: &PermissionCode,
        project_id: Option<ProjectId>,
    ) -> AppResult<bool> {
        Ok(self.resolve(user_id, project_id).await?.contains(code))
    }
}
