use std::collections::BTreeSet;

use rolegate_core::{ProjectId, RoleId, UserId};
use serde::Serialize;

use crate::{PermissionCode, Role, RoleScope};

/// Domain event emitted by the manager after each committed state change.
///
/// Payloads carry before/after state so an external audit log can
/// reconstruct history from the event stream alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RbacEvent {
    /// A role was created.
    RoleCreated {
        /// Administrator performing the change.
        actor: UserId,
        /// Role as persisted.
        role: Role,
    },
    /// A role's name, description or override flag changed.
    RoleUpdated {
        /// Administrator performing the change.
        actor: UserId,
        /// Role state before the update.
        before: Role,
        /// Role state after the update.
        after: Role,
    },
    /// A role was deleted.
    RoleDeleted {
        /// Administrator performing the change.
        actor: UserId,
        /// Role state at deletion time.
        role: Role,
    },
    /// A role's permission set was replaced.
    RolePermissionsSynced {
        /// Administrator performing the change.
        actor: UserId,
        /// Affected role.
        role_id: RoleId,
        /// Role name at sync time.
        role_name: String,
        /// Grants before the replace.
        before: BTreeSet<PermissionCode>,
        /// Grants after the replace.
        after: BTreeSet<PermissionCode>,
    },
    /// A role was assigned to a user.
    AssignmentCreated {
        /// Administrator performing the change.
        actor: UserId,
        /// User receiving the role.
        user_id: UserId,
        /// Assigned role.
        role_id: RoleId,
        /// Scope of the assignment.
        scope: RoleScope,
        /// Project context for project-scope assignments.
        project_id: Option<ProjectId>,
    },
    /// A role assignment was removed from a user.
    AssignmentRemoved {
        /// Administrator performing the change.
        actor: UserId,
        /// User losing the role.
        user_id: UserId,
        /// Removed role.
        role_id: RoleId,
        /// Scope of the assignment.
        scope: RoleScope,
        /// Project context for project-scope assignments.
        project_id: Option<ProjectId>,
    },
}

impl RbacEvent {
    /// Returns the stable event name published on the bus.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleCreated { .. } => "rbac.role.created",
            Self::RoleUpdated { .. } => "rbac.role.updated",
            Self::RoleDeleted { .. } => "rbac.role.deleted",
            Self::RolePermissionsSynced { .. } => "rbac.role.permissions.synced",
            Self::AssignmentCreated { .. } => "rbac.assignment.created",
            Self::AssignmentRemoved { .. } => "rbac.assignment.removed",
        }
    }
}
